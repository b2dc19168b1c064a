//! The network-facing half of the service: the RPC adapter (C8, `http.rs`)
//! and the gateway multiplexer (C9, `ws.rs`), tied together by `run.rs`.

pub mod http;
pub mod idempotency;
pub mod run;
pub mod state;
pub mod ws;

pub use run::{build_router, run_server};
pub use state::AppState;
