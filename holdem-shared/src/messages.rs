//! WebSocket wire protocol between the gateway (C9) and browser clients (§6).

use serde::{Deserialize, Serialize};

use crate::action::ActionInput;
use crate::ids::TableId;
use crate::state::TableState;
use crate::table::TableSummary;
use crate::cards::Card;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMsg {
    Authenticate { token: String },
    SubscribeTable { table_id: TableId },
    UnsubscribeTable { table_id: TableId },
    Action { table_id: TableId, action: ActionInput },
    ChatSend { table_id: TableId, text: String },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMsg {
    Welcome {
        user_id: String,
        connection_id: String,
    },
    TableSnapshot {
        table_state: TableState,
    },
    TablePatch {
        table_state: TableState,
    },
    HoleCards {
        table_id: TableId,
        hand_id: crate::ids::HandId,
        cards: [Card; 2],
    },
    ActionResult {
        accepted: bool,
        reason: Option<String>,
    },
    LobbyTablesUpdated {
        tables: Vec<TableSummary>,
    },
    ChatReceived {
        table_id: TableId,
        user_id: String,
        text: String,
        timestamp_ms: u64,
    },
    Error {
        code: String,
        message: String,
    },
}
