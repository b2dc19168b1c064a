//! Broadcast bus (spec component C7). `tokio::sync::broadcast` is the
//! in-process analogue of the Redis/NATS pub-sub described in §4.8: every
//! table gets its own channel carrying gateway-ready `ServerMsg` values, so a
//! slow subscriber on one table can't cause another table's subscribers to
//! lag, plus one lobby-wide channel for `LobbyTablesUpdated`.

use std::collections::HashMap;
use std::sync::Arc;

use holdem_shared::ids::TableId;
use holdem_shared::messages::ServerMsg;
use holdem_shared::table::TableSummary;
use tokio::sync::{broadcast, RwLock};

const TABLE_CHANNEL_CAPACITY: usize = 256;
const LOBBY_CHANNEL_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct BroadcastBus {
    tables: Arc<RwLock<HashMap<TableId, broadcast::Sender<ServerMsg>>>>,
    lobby: broadcast::Sender<Vec<TableSummary>>,
}

impl BroadcastBus {
    pub fn new() -> Self {
        let (lobby, _) = broadcast::channel(LOBBY_CHANNEL_CAPACITY);
        Self {
            tables: Arc::new(RwLock::new(HashMap::new())),
            lobby,
        }
    }

    async fn sender_for(&self, table_id: TableId) -> broadcast::Sender<ServerMsg> {
        if let Some(tx) = self.tables.read().await.get(&table_id) {
            return tx.clone();
        }
        let mut guard = self.tables.write().await;
        guard
            .entry(table_id)
            .or_insert_with(|| broadcast::channel(TABLE_CHANNEL_CAPACITY).0)
            .clone()
    }

    pub async fn subscribe_table(&self, table_id: TableId) -> broadcast::Receiver<ServerMsg> {
        self.sender_for(table_id).await.subscribe()
    }

    pub fn subscribe_lobby(&self) -> broadcast::Receiver<Vec<TableSummary>> {
        self.lobby.subscribe()
    }

    /// Publish to a table's channel. Returns without error if nobody is
    /// subscribed — `send` only fails when there are zero receivers, and an
    /// unwatched table publishing its own events is normal.
    pub async fn publish_table(&self, table_id: TableId, msg: ServerMsg) {
        let _ = self.sender_for(table_id).await.send(msg);
    }

    pub fn publish_lobby(&self, tables: Vec<TableSummary>) {
        let _ = self.lobby.send(tables);
    }

    pub async fn drop_table(&self, table_id: TableId) {
        self.tables.write().await.remove(&table_id);
    }
}

impl Default for BroadcastBus {
    fn default() -> Self {
        Self::new()
    }
}
