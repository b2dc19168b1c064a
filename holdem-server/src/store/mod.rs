//! In-process table store (spec component C2).
//!
//! A single `RwLock`-guarded map keyed by `TableId`. This is the reference
//! implementation's substitute for a sharded external store: reads take a
//! shared guard and clone out a snapshot, writes go through the per-table
//! serializer in `orchestrator` so only one task at a time ever holds a
//! mutable view of a given table's state.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use holdem_shared::ids::{TableId, UserId};
use holdem_shared::state::TableState;
use holdem_shared::table::{Table, TableConfig};
use tokio::sync::RwLock;

/// One table's metadata (including its immutable config), live state, and
/// its muted-user set (the spec's `mutes:{tableId}`).
pub struct TableEntry {
    pub table: Table,
    pub state: TableState,
    pub muted: HashSet<UserId>,
}

#[derive(Clone, Default)]
pub struct TableStore {
    inner: Arc<RwLock<HashMap<TableId, TableEntry>>>,
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, entry: TableEntry) {
        let mut guard = self.inner.write().await;
        guard.insert(entry.table.table_id, entry);
    }

    pub async fn remove(&self, table_id: TableId) -> Option<TableEntry> {
        let mut guard = self.inner.write().await;
        guard.remove(&table_id)
    }

    /// Clone out a redacted snapshot of a table's state, if it exists.
    pub async fn snapshot(&self, table_id: TableId) -> Option<TableState> {
        let guard = self.inner.read().await;
        guard.get(&table_id).map(|e| e.state.clone())
    }

    pub async fn config_of(&self, table_id: TableId) -> Option<TableConfig> {
        let guard = self.inner.read().await;
        guard.get(&table_id).map(|e| e.table.config.clone())
    }

    pub async fn summary_of(&self, table_id: TableId) -> Option<Table> {
        let guard = self.inner.read().await;
        guard.get(&table_id).map(|e| e.table.clone())
    }

    pub async fn list_tables(&self) -> Vec<Table> {
        let guard = self.inner.read().await;
        guard.values().map(|e| e.table.clone()).collect()
    }

    pub async fn contains(&self, table_id: TableId) -> bool {
        self.inner.read().await.contains_key(&table_id)
    }

    pub async fn is_muted(&self, table_id: TableId, user_id: &UserId) -> bool {
        self.inner
            .read()
            .await
            .get(&table_id)
            .map(|e| e.muted.contains(user_id))
            .unwrap_or(false)
    }

    /// Run `f` against the table's mutable state under the write lock.
    /// Callers that need exclusivity across a whole action pipeline should
    /// route through the per-table serializer instead of calling this
    /// directly from multiple places.
    pub async fn with_mut<R>(
        &self,
        table_id: TableId,
        f: impl FnOnce(&mut TableEntry) -> R,
    ) -> Option<R> {
        let mut guard = self.inner.write().await;
        guard.get_mut(&table_id).map(f)
    }
}
