//! Wire and domain types shared between the game service and its gateway.
//!
//! Everything in this crate is transport-agnostic: it crosses process
//! boundaries (RPC, WebSocket, pub/sub) and must stay serde-friendly and
//! free of any I/O.

pub mod action;
pub mod cards;
pub mod errors;
pub mod events;
pub mod hand_rank;
pub mod ids;
pub mod ledger;
pub mod messages;
pub mod state;
pub mod table;

pub use action::*;
pub use cards::*;
pub use errors::*;
pub use events::*;
pub use hand_rank::*;
pub use ids::*;
pub use ledger::*;
pub use messages::*;
pub use state::*;
pub use table::*;
