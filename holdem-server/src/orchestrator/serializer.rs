//! Per-table serializer (spec component C3): guarantees at-most-one
//! in-flight mutation per key. Implemented as a map of per-key `tokio::sync`
//! mutexes rather than a hand-rolled task queue — tokio's mutex already
//! grants waiters access in roughly arrival order, which is all the FIFO
//! guarantee a single-process orchestrator needs, and it composes with
//! `.await` without a dedicated worker task per key.
//!
//! Two instances are kept: one keyed by `TableId` for state mutations, one
//! keyed by `(TableId, SeatId)` for buy-in finalisation, so a seat-join's
//! ledger round-trip never blocks other tables' or other seats' actions.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

pub struct KeyedSerializer<K> {
    locks: RwLock<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone> KeyedSerializer<K> {
    pub fn new() -> Self {
        Self {
            locks: RwLock::new(HashMap::new()),
        }
    }

    async fn lock_for(&self, key: &K) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(key) {
            return lock.clone();
        }
        let mut guard = self.locks.write().await;
        guard.entry(key.clone()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// Acquire exclusivity for `key`. Hold the returned guard for the
    /// duration of the operation; dropping it releases the next waiter.
    pub async fn acquire(&self, key: &K) -> OwnedMutexGuard<()> {
        let lock = self.lock_for(key).await;
        lock.lock_owned().await
    }

    /// Drop the lock entry entirely (used when a table is deleted, so the
    /// map doesn't grow unboundedly over the service's lifetime).
    pub async fn forget(&self, key: &K) {
        self.locks.write().await.remove(key);
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedSerializer<K> {
    fn default() -> Self {
        Self::new()
    }
}
