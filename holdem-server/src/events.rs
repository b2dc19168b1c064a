//! Event publishing (spec component C6): builds the wire `EventEnvelope` for
//! a domain occurrence and emits it with a deterministic idempotency key.
//! The out-of-scope Event Store is the real destination for these in a full
//! deployment; here they're logged as structured tracing events, which is
//! the faithful stand-in for "fire-and-forget emission to an external
//! collector" when that collector isn't part of this service.

use holdem_shared::events::{EventEnvelope, EventType};
use holdem_shared::ids::{HandId, SeatId, TableId, UserId};
use serde_json::Value;

use crate::broadcast::BroadcastBus;

pub struct EventPublisher {
    #[allow(dead_code)]
    bus: BroadcastBus,
}

impl EventPublisher {
    pub fn new(bus: BroadcastBus) -> Self {
        Self { bus }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn publish(
        &self,
        event_type: EventType,
        table_id: TableId,
        hand_id: Option<HandId>,
        user_id: Option<UserId>,
        seat_id: Option<SeatId>,
        payload: Value,
    ) {
        let idempotency_key = format!(
            "event:{:?}:{}:{}",
            event_type,
            table_id,
            hand_id.map(|h| h.to_string()).unwrap_or_default(),
        );
        self.publish_with_key(event_type, table_id, hand_id, user_id, seat_id, idempotency_key, payload)
            .await;
    }

    /// Like `publish`, but with an explicit idempotency key instead of the
    /// table/hand-derived default. `ACTION_TAKEN` uses this (§4.4(e)) so each
    /// action's retries dedupe independently of every other action in the
    /// same hand.
    #[allow(clippy::too_many_arguments)]
    pub async fn publish_with_key(
        &self,
        event_type: EventType,
        table_id: TableId,
        hand_id: Option<HandId>,
        user_id: Option<UserId>,
        seat_id: Option<SeatId>,
        idempotency_key: String,
        payload: Value,
    ) {
        let envelope = EventEnvelope {
            event_type,
            table_id,
            hand_id,
            user_id,
            seat_id,
            payload,
            idempotency_key,
        };
        tracing::info!(
            event = ?envelope.event_type,
            table_id = %envelope.table_id,
            hand_id = ?envelope.hand_id,
            user_id = ?envelope.user_id,
            idempotency_key = %envelope.idempotency_key,
            payload = %envelope.payload,
            "domain event"
        );
    }
}
