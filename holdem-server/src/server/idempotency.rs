//! Input-idempotency cache for the RPC adapter (§4.9): within a shared TTL,
//! the first successful result for a `(method, idempotencyKey)` pair is
//! cached and returned verbatim on retry. A second caller arriving while
//! the first is still in flight gets `IdempotencyInProgress` rather than
//! racing the underlying operation twice.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use holdem_shared::errors::GameError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

/// TTL tiers named in §4.9.
pub const TTL_TABLE_LIFECYCLE: Duration = Duration::from_secs(3600);
pub const TTL_SEAT_ACTION: Duration = Duration::from_secs(300);
pub const TTL_MODERATION: Duration = Duration::from_secs(60);

enum Entry {
    InProgress,
    Done {
        value: Result<serde_json::Value, GameError>,
        expires_at_ms: u64,
    },
}

#[derive(Default)]
pub struct IdempotencyCache {
    inner: Mutex<HashMap<(String, String), Entry>>,
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock before epoch")
        .as_millis() as u64
}

impl IdempotencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `fut` under the cache for `(method, key)`, caching a successful
    /// result for `ttl`. A concurrent caller for the same key while `fut` is
    /// still running gets `GameError::IdempotencyInProgress` instead of
    /// re-entering the operation.
    pub async fn run<T, F>(
        &self,
        method: &str,
        key: &str,
        ttl: Duration,
        fut: F,
    ) -> Result<T, GameError>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = Result<T, GameError>>,
    {
        let cache_key = (method.to_string(), key.to_string());

        {
            let mut guard = self.inner.lock().await;
            match guard.get(&cache_key) {
                Some(Entry::InProgress) => return Err(GameError::IdempotencyInProgress),
                Some(Entry::Done { value, expires_at_ms }) if *expires_at_ms > now_ms() => {
                    return match value {
                        Ok(v) => serde_json::from_value(v.clone())
                            .map_err(|e| GameError::Internal(e.to_string())),
                        Err(e) => Err(e.clone()),
                    };
                }
                _ => {}
            }
            guard.insert(cache_key.clone(), Entry::InProgress);
        }

        let result = fut.await;

        let stored = match &result {
            Ok(v) => serde_json::to_value(v)
                .map(Ok)
                .unwrap_or_else(|e| Err(GameError::Internal(e.to_string()))),
            Err(e) => Err(e.clone()),
        };
        let mut guard = self.inner.lock().await;
        guard.insert(
            cache_key,
            Entry::Done {
                value: stored,
                expires_at_ms: now_ms() + ttl.as_millis() as u64,
            },
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn replays_cached_result_without_rerunning() {
        let cache = IdempotencyCache::new();
        let calls = Arc::new(AtomicU32::new(0));

        let run_once = |calls: Arc<AtomicU32>| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<u64, GameError>(42)
        };

        let first = cache
            .run("createTable", "k1", TTL_TABLE_LIFECYCLE, run_once(calls.clone()))
            .await
            .unwrap();
        let second = cache
            .run("createTable", "k1", TTL_TABLE_LIFECYCLE, run_once(calls.clone()))
            .await
            .unwrap();

        assert_eq!(first, 42);
        assert_eq!(second, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_keys_run_independently() {
        let cache = IdempotencyCache::new();
        let a = cache
            .run("submitAction", "a", TTL_SEAT_ACTION, async { Ok::<u64, GameError>(1) })
            .await
            .unwrap();
        let b = cache
            .run("submitAction", "b", TTL_SEAT_ACTION, async { Ok::<u64, GameError>(2) })
            .await
            .unwrap();
        assert_eq!((a, b), (1, 2));
    }
}
