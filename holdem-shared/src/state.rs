//! The authoritative per-table snapshot, mutated only by the orchestrator.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::action::ActionLogEntry;
use crate::cards::Card;
use crate::hand_rank::HandResult;
use crate::ids::{HandId, SeatId, TableId, UserId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatStatus {
    Empty,
    Reserved,
    Seated,
    Active,
    Folded,
    AllIn,
    SittingOut,
    Disconnected,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Seat {
    pub seat_id: SeatId,
    pub user_id: Option<UserId>,
    pub stack: u64,
    pub status: SeatStatus,
    /// Redacted (set to `None`) on every snapshot except the one sent to the
    /// owning user's own connection.
    pub hole_cards: Option<[Card; 2]>,
    pub reservation_id: Option<crate::ids::ReservationId>,
    pub pending_buy_in_amount: Option<u64>,
    pub buy_in_idempotency_key: Option<String>,
    pub last_action_ms: Option<u64>,
}

impl Seat {
    pub fn empty(seat_id: SeatId) -> Self {
        Self {
            seat_id,
            user_id: None,
            stack: 0,
            status: SeatStatus::Empty,
            hole_cards: None,
            reservation_id: None,
            pending_buy_in_amount: None,
            buy_in_idempotency_key: None,
            last_action_ms: None,
        }
    }

    /// Strip every field that must never cross the trust boundary except to
    /// the seat's own owner (§3 invariant 6).
    pub fn redacted(&self) -> Self {
        Self {
            hole_cards: None,
            reservation_id: None,
            pending_buy_in_amount: None,
            buy_in_idempotency_key: None,
            ..self.clone()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpectatorStatus {
    Watching,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Spectator {
    pub user_id: UserId,
    pub status: SpectatorStatus,
    pub joined_at_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pot {
    pub amount: u64,
    pub eligible_seats: BTreeSet<SeatId>,
    pub winners: Option<Vec<SeatId>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HandState {
    pub hand_id: HandId,
    pub table_id: TableId,
    pub street: Street,
    pub community_cards: Vec<Card>,
    pub deck: Vec<Card>,
    pub pots: Vec<Pot>,
    pub current_bet: u64,
    pub min_raise: u64,
    pub big_blind: u64,
    pub turn: SeatId,
    pub last_aggressor: Option<SeatId>,
    pub round_contributions: BTreeMap<SeatId, u64>,
    pub total_contributions: BTreeMap<SeatId, u64>,
    pub acted_seats: BTreeSet<SeatId>,
    pub raise_capped: bool,
    pub actions: Vec<ActionLogEntry>,
    pub rake_amount: u64,
    pub started_at_ms: u64,
    pub ended_at_ms: Option<u64>,
    pub winners: Option<Vec<HandResult>>,
    /// Per-seat chip amounts actually awarded this hand (post-rake), as
    /// derived by `award_fold_win`/`resolve_showdown` via
    /// `calculate_pot_payouts`. This is what gets reported to the ledger's
    /// `SettlePot` call, not a seat's post-award stack.
    pub payouts: BTreeMap<SeatId, u64>,
    /// Set when the hand ended because a turn timer fired an auto-action.
    pub timed_out: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TableState {
    pub table_id: TableId,
    pub button: SeatId,
    pub version: u64,
    pub updated_at_ms: u64,
    pub seats: Vec<Seat>,
    pub spectators: Vec<Spectator>,
    pub hand: Option<HandState>,
}

impl TableState {
    pub fn new(table_id: TableId, max_players: u8) -> Self {
        Self {
            table_id,
            button: SeatId(0),
            version: 0,
            updated_at_ms: 0,
            seats: (0..max_players).map(|i| Seat::empty(SeatId(i))).collect(),
            spectators: Vec::new(),
            hand: None,
        }
    }

    /// A redacted copy suitable for broadcast to every subscriber. `viewer`
    /// additionally receives their own hole cards, if seated.
    pub fn redacted_for(&self, viewer: Option<&UserId>) -> TableState {
        let mut copy = self.clone();
        for seat in &mut copy.seats {
            let is_viewer = viewer.is_some() && seat.user_id.as_ref() == viewer;
            if !is_viewer {
                *seat = seat.redacted();
            } else {
                seat.reservation_id = None;
                seat.pending_buy_in_amount = None;
                seat.buy_in_idempotency_key = None;
            }
        }
        copy
    }

    pub fn seat_index_of(&self, user_id: &UserId) -> Option<SeatId> {
        self.seats
            .iter()
            .find(|s| s.user_id.as_ref() == Some(user_id))
            .map(|s| s.seat_id)
    }
}
