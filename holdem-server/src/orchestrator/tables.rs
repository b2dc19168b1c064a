//! Table lifecycle: create / delete / list (spec §4.4 `createTable`,
//! `deleteTable`, `getTable`, `getTableState`).

use holdem_shared::errors::GameError;
use holdem_shared::events::EventType;
use holdem_shared::ids::{TableId, UserId};
use holdem_shared::state::TableState;
use holdem_shared::table::{Table, TableConfig, TableStatus, TableSummary};

use super::Orchestrator;
use crate::store::TableEntry;

impl Orchestrator {
    pub async fn create_table(
        &self,
        name: String,
        owner_id: UserId,
        config: TableConfig,
    ) -> Result<Table, GameError> {
        config
            .validate()
            .map_err(|e| GameError::Internal(format!("{:?}", e)))?;

        let table_id = TableId::new();
        let now = self.now_ms();
        let table = Table {
            table_id,
            name,
            owner_id,
            created_at_ms: now,
            config: config.clone(),
            status: TableStatus::Waiting,
        };
        let mut state = TableState::new(table_id, config.max_players);
        state.updated_at_ms = now;

        self.store
            .insert(TableEntry {
                table: table.clone(),
                state,
                muted: Default::default(),
            })
            .await;

        self.publish_snapshot(table_id).await;
        self.publish_lobby().await;
        self.publish_event(
            EventType::TableCreated,
            table_id,
            None,
            None,
            None,
            serde_json::json!({ "name": table.name }),
        )
        .await;

        Ok(table)
    }

    pub async fn delete_table(&self, table_id: TableId) -> Result<(), GameError> {
        let _guard = self.table_locks.acquire(&table_id).await;
        self.store
            .remove(table_id)
            .await
            .ok_or(GameError::TableNotFound)?;
        self.bus.drop_table(table_id).await;
        self.table_locks.forget(&table_id).await;
        self.timers.clear_table(table_id).await;

        self.publish_lobby().await;
        self.publish_event(
            EventType::TableDeleted,
            table_id,
            None,
            None,
            None,
            serde_json::Value::Null,
        )
        .await;
        Ok(())
    }

    pub async fn get_table(&self, table_id: TableId) -> Result<Table, GameError> {
        self.store
            .summary_of(table_id)
            .await
            .ok_or(GameError::TableNotFound)
    }

    /// Redacted snapshot for `viewer` (their own hole cards are included).
    /// Rearms the turn timer if a hand is in progress but no timer is
    /// currently scheduled, per §4.4.
    pub async fn get_table_state(
        &self,
        table_id: TableId,
        viewer: Option<&UserId>,
    ) -> Result<TableState, GameError> {
        let state = self
            .store
            .snapshot(table_id)
            .await
            .ok_or(GameError::TableNotFound)?;

        if let Some(hand) = &state.hand {
            if !self.timers.has_turn_timer(table_id).await {
                let config = self
                    .store
                    .config_of(table_id)
                    .await
                    .ok_or(GameError::TableNotFound)?;
                self.start_turn_timer(table_id, hand.hand_id, hand.turn, config.turn_timer_seconds)
                    .await;
            }
        }

        Ok(state.redacted_for(viewer))
    }

    pub async fn list_tables(&self) -> Vec<TableSummary> {
        let tables = self.store.list_tables().await;
        let mut out = Vec::with_capacity(tables.len());
        for t in tables {
            if let Some(state) = self.store.snapshot(t.table_id).await {
                let seated_count = state
                    .seats
                    .iter()
                    .filter(|s| s.user_id.is_some())
                    .count() as u8;
                out.push(TableSummary {
                    table_id: t.table_id,
                    name: t.name,
                    status: t.status,
                    seated_count,
                    max_players: t.config.max_players,
                    small_blind: t.config.small_blind,
                    big_blind: t.config.big_blind,
                });
            }
        }
        out
    }
}
