//! Domain events published by the orchestrator (§6). Each is fire-and-forget
//! from the orchestrator's perspective but carries a deterministic
//! idempotency key so downstream consumers can dedupe retries.

use serde::{Deserialize, Serialize};

use crate::hand_rank::HandResult;
use crate::ids::{HandId, SeatId, TableId, UserId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    TableCreated,
    TableDeleted,
    PlayerJoined,
    PlayerLeft,
    SpectatorJoined,
    SpectatorLeft,
    HandStarted,
    HandEnded,
    HandCompleted,
    PreflopDealt,
    FlopDealt,
    TurnDealt,
    RiverDealt,
    ActionTaken,
    TurnStarted,
    TurnTimeout,
    CardsShown,
    PotAwarded,
    PlayerKicked,
    PlayerMuted,
    PlayerUnmuted,
    BalanceUnavailable,
    CashoutFailed,
    SettlementFailed,
    SessionStarted,
    SessionEnded,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub table_id: TableId,
    pub hand_id: Option<HandId>,
    pub user_id: Option<UserId>,
    pub seat_id: Option<SeatId>,
    pub payload: serde_json::Value,
    pub idempotency_key: String,
}

/// External action label attached to `BALANCE_UNAVAILABLE` events, naming
/// which ledger call could not be confirmed.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum BalanceUnavailableAction {
    BuyIn,
    RecordContribution,
    CashOut,
    Settlement,
}

/// Outcome label attached to `HAND_ENDED` payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandOutcome {
    Timeout,
    FoldWin,
    Showdown,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HandEndedPayload {
    pub outcome: HandOutcome,
    pub winners: Vec<HandResult>,
    pub winner_user_ids: Vec<UserId>,
    pub rake_amount: u64,
}
