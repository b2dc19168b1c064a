//! Table Orchestrator (spec component C4): the stateful coordinator that
//! loads/saves state through the store, drives the engine, dispatches
//! ledger calls, emits events, and manages turn/restart timers. Every
//! public operation here is safe to call concurrently — table-level
//! exclusivity comes from `table_locks`, not from the caller.

pub mod actions;
pub mod hand_lifecycle;
pub mod seat_resolution;
pub mod seats;
pub mod serializer;
pub mod tables;
pub mod timers;

use std::sync::{Arc, Weak};
use std::time::{SystemTime, UNIX_EPOCH};

use holdem_shared::events::EventType;
use holdem_shared::ids::{HandId, SeatId, TableId, UserId};
use holdem_shared::messages::ServerMsg;
use serde_json::Value;

use crate::broadcast::BroadcastBus;
use crate::config::Config;
use crate::events::EventPublisher;
use crate::ledger::LedgerClient;
use crate::store::TableStore;
use serializer::KeyedSerializer;
use timers::TimerRegistry;

pub struct Orchestrator {
    pub(crate) store: TableStore,
    pub(crate) bus: BroadcastBus,
    pub(crate) events: EventPublisher,
    pub(crate) ledger: Arc<dyn LedgerClient>,
    pub(crate) config: Config,
    pub(crate) table_locks: KeyedSerializer<TableId>,
    pub(crate) seat_locks: KeyedSerializer<(TableId, SeatId)>,
    pub(crate) timers: TimerRegistry,
    /// A weak handle to itself so timer callbacks (which must be `'static`)
    /// can re-enter orchestrator methods without every caller needing to
    /// hold an `Arc<Orchestrator>` just to schedule a timer.
    pub(crate) self_ref: Weak<Orchestrator>,
}

impl Orchestrator {
    pub fn new(
        store: TableStore,
        bus: BroadcastBus,
        ledger: Arc<dyn LedgerClient>,
        config: Config,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            store,
            bus: bus.clone(),
            events: EventPublisher::new(bus),
            ledger,
            config,
            table_locks: KeyedSerializer::new(),
            seat_locks: KeyedSerializer::new(),
            timers: TimerRegistry::new(),
            self_ref: weak.clone(),
        })
    }

    pub fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before epoch")
            .as_millis() as u64
    }

    /// Publish a redacted snapshot to every subscriber of this table's
    /// channel (spec §4.8: `{channel:"table", payload:{type:"TableSnapshot"}}`).
    /// Per-connection personalization (a viewer's own hole cards) happens in
    /// the gateway, which holds the unredacted-for-owner view separately.
    pub async fn publish_snapshot(&self, table_id: TableId) {
        if let Some(state) = self.store.snapshot(table_id).await {
            let redacted = state.redacted_for(None);
            self.bus
                .publish_table(table_id, ServerMsg::TableSnapshot { table_state: redacted })
                .await;
        }
    }

    pub async fn publish_lobby(&self) {
        let tables = self.list_tables().await;
        self.bus.publish_lobby(tables);
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn publish_event(
        &self,
        event_type: EventType,
        table_id: TableId,
        hand_id: Option<HandId>,
        user_id: Option<UserId>,
        seat_id: Option<SeatId>,
        payload: Value,
    ) {
        self.events
            .publish(event_type, table_id, hand_id, user_id, seat_id, payload)
            .await;
    }

    /// `ACTION_TAKEN` is keyed on the action id rather than the table/hand
    /// pair every other event defaults to (§4.4(e)), so retries of distinct
    /// actions within the same hand dedupe independently.
    #[allow(clippy::too_many_arguments)]
    pub async fn publish_action_taken_event(
        &self,
        table_id: TableId,
        hand_id: HandId,
        user_id: UserId,
        seat_id: SeatId,
        action_id: holdem_shared::ids::ActionId,
        payload: Value,
    ) {
        self.events
            .publish_with_key(
                EventType::ActionTaken,
                table_id,
                Some(hand_id),
                Some(user_id),
                Some(seat_id),
                format!("event:ActionTaken:{}", action_id),
                payload,
            )
            .await;
    }
}
