//! Shared axum state: the orchestrator handle plus the idempotency cache.

use std::sync::Arc;

use crate::orchestrator::Orchestrator;
use crate::server::idempotency::IdempotencyCache;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub idempotency: Arc<IdempotencyCache>,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            idempotency: Arc::new(IdempotencyCache::new()),
        }
    }
}
