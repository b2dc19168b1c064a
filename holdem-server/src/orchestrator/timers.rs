//! Turn timer and next-hand restart scheduler (spec §4.5). At most one
//! active turn timer and one pending next-hand timer per table; starting a
//! new one always cancels whatever was previously scheduled for that table.

use std::collections::HashMap;

use holdem_shared::ids::{HandId, SeatId, TableId};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

#[derive(Default)]
pub struct TimerRegistry {
    turn_timers: Mutex<HashMap<TableId, (HandId, SeatId, JoinHandle<()>)>>,
    next_hand_timers: Mutex<HashMap<TableId, JoinHandle<()>>>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn has_turn_timer(&self, table_id: TableId) -> bool {
        self.turn_timers.lock().await.contains_key(&table_id)
    }

    pub async fn set_turn_timer(
        &self,
        table_id: TableId,
        hand_id: HandId,
        seat_id: SeatId,
        handle: JoinHandle<()>,
    ) {
        let mut guard = self.turn_timers.lock().await;
        if let Some((_, _, old)) = guard.insert(table_id, (hand_id, seat_id, handle)) {
            old.abort();
        }
    }

    /// True if `hand_id`/`seat_id` still match what's currently scheduled —
    /// used by the expiry callback to detect a stale fire (§4.5 step 1).
    pub async fn matches_current(&self, table_id: TableId, hand_id: HandId, seat_id: SeatId) -> bool {
        self.turn_timers
            .lock()
            .await
            .get(&table_id)
            .map(|(h, s, _)| *h == hand_id && *s == seat_id)
            .unwrap_or(false)
    }

    pub async fn clear_turn_timer(&self, table_id: TableId) {
        if let Some((_, _, handle)) = self.turn_timers.lock().await.remove(&table_id) {
            handle.abort();
        }
    }

    pub async fn set_next_hand_timer(&self, table_id: TableId, handle: JoinHandle<()>) {
        let mut guard = self.next_hand_timers.lock().await;
        if let Some(old) = guard.insert(table_id, handle) {
            old.abort();
        }
    }

    pub async fn clear_table(&self, table_id: TableId) {
        self.clear_turn_timer(table_id).await;
        if let Some(handle) = self.next_hand_timers.lock().await.remove(&table_id) {
            handle.abort();
        }
    }
}
