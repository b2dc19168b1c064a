//! Router assembly and the top-level `run_server` entry point used by `main`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::orchestrator::Orchestrator;

use super::http;
use super::state::AppState;
use super::ws::ws_handler;

/// This service is a bare game backend — no bundled web UI (the teacher's
/// `ServeDir`-served frontend isn't part of this spec, see DESIGN.md).
pub fn build_router(orchestrator: Arc<Orchestrator>) -> Router {
    let state = AppState::new(orchestrator);
    Router::new()
        .route("/ws", get(ws_handler))
        .merge(http::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(orchestrator: Arc<Orchestrator>, bind_addr: &str) -> Result<()> {
    let router = build_router(orchestrator);
    let addr: SocketAddr = bind_addr
        .parse()
        .with_context(|| format!("parsing bind address '{bind_addr}'"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding listener on '{bind_addr}'"))?;

    tracing::info!(%addr, "holdem-server listening");
    axum::serve(listener, router)
        .await
        .context("serving HTTP/WS traffic")?;
    Ok(())
}
