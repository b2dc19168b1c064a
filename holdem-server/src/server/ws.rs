//! Gateway multiplexer (spec component C9): one axum WebSocket connection
//! per client, fanning broadcast-bus traffic for however many tables the
//! client has subscribed to into that single socket.
//!
//! Per-table forwarding is a spawned task per subscription (mirroring
//! `orchestrator::timers::TimerRegistry`'s JoinHandle+abort pattern) rather
//! than a dynamic `Stream` combinator: subscribing spawns a task that drains
//! a `broadcast::Receiver<ServerMsg>` into the connection's outbound queue,
//! unsubscribing aborts it.

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use holdem_shared::events::EventType;
use holdem_shared::ids::{TableId, UserId};
use holdem_shared::messages::{ClientMsg, ServerMsg};

use super::state::AppState;

const AUTH_DEADLINE: Duration = Duration::from_secs(5);
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const OUTBOUND_QUEUE_CAPACITY: usize = 256;

#[derive(Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.token))
}

async fn handle_socket(socket: WebSocket, state: AppState, token: Option<String>) {
    let (mut sink, mut stream) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<Message>(OUTBOUND_QUEUE_CAPACITY);

    let writer = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if sink.send(msg).await.is_err() {
                break;
            }
        }
    });

    let user_id = match authenticate(&mut stream, &outbound_tx, token).await {
        Some(u) => u,
        None => {
            let _ = outbound_tx
                .send(Message::Close(Some(axum::extract::ws::CloseFrame {
                    code: 1008,
                    reason: "Authentication required".into(),
                })))
                .await;
            drop(outbound_tx);
            let _ = writer.await;
            return;
        }
    };

    let connection_id = uuid::Uuid::new_v4().to_string();
    send_json(
        &outbound_tx,
        &ServerMsg::Welcome {
            user_id: user_id.0.clone(),
            connection_id: connection_id.clone(),
        },
    )
    .await;
    // SESSION_STARTED/SESSION_ENDED are connection-scoped rather than
    // table-scoped; the envelope's table_id is a nil sentinel here since
    // the wire schema always carries one (§6).
    state
        .orchestrator
        .publish_event(
            EventType::SessionStarted,
            TableId(uuid::Uuid::nil()),
            None,
            Some(user_id.clone()),
            None,
            serde_json::json!({ "connection_id": connection_id }),
        )
        .await;

    let mut table_forwarders: HashMap<TableId, JoinHandle<()>> = HashMap::new();
    let lobby_forwarder = spawn_lobby_forwarder(&state, outbound_tx.clone());

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await; // first tick fires immediately; consume it
    let mut awaiting_pong = false;

    loop {
        tokio::select! {
            maybe_msg = stream.next() => {
                match maybe_msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_text(&state, &user_id, &text, &outbound_tx, &mut table_forwarders).await;
                    }
                    Some(Ok(Message::Pong(_))) => {
                        awaiting_pong = false;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
            _ = heartbeat.tick() => {
                if awaiting_pong {
                    break;
                }
                awaiting_pong = true;
                if outbound_tx.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    for (_, handle) in table_forwarders.drain() {
        handle.abort();
    }
    lobby_forwarder.abort();
    state
        .orchestrator
        .publish_event(
            EventType::SessionEnded,
            // nil sentinel, see SESSION_STARTED above
            TableId(uuid::Uuid::nil()),
            None,
            Some(user_id),
            None,
            serde_json::json!({ "connection_id": connection_id }),
        )
        .await;
    drop(outbound_tx);
    let _ = writer.await;
}

/// Either accept `?token=` immediately, or wait up to `AUTH_DEADLINE` for an
/// in-protocol `Authenticate` message. The token is treated directly as the
/// `UserId` — the out-of-scope OIDC layer is expected to front this gateway.
async fn authenticate(
    stream: &mut futures_util::stream::SplitStream<WebSocket>,
    _outbound_tx: &mpsc::Sender<Message>,
    token: Option<String>,
) -> Option<UserId> {
    if let Some(token) = token {
        return Some(UserId(token));
    }

    let deadline = tokio::time::sleep(AUTH_DEADLINE);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => return None,
            maybe_msg = stream.next() => {
                match maybe_msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(ClientMsg::Authenticate { token }) = serde_json::from_str(&text) {
                            return Some(UserId(token));
                        }
                    }
                    Some(Ok(_)) => continue,
                    _ => return None,
                }
            }
        }
    }
}

fn spawn_lobby_forwarder(state: &AppState, outbound_tx: mpsc::Sender<Message>) -> JoinHandle<()> {
    let mut rx = state.orchestrator.bus.subscribe_lobby();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(tables) => {
                    send_json(&outbound_tx, &ServerMsg::LobbyTablesUpdated { tables }).await;
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn spawn_table_forwarder(state: &AppState, table_id: TableId, outbound_tx: mpsc::Sender<Message>) -> JoinHandle<()> {
    let bus = state.orchestrator.bus.clone();
    tokio::spawn(async move {
        let mut rx = bus.subscribe_table(table_id).await;
        loop {
            match rx.recv().await {
                Ok(msg) => send_json(&outbound_tx, &msg).await,
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

async fn handle_client_text(
    state: &AppState,
    user_id: &UserId,
    text: &str,
    outbound_tx: &mpsc::Sender<Message>,
    table_forwarders: &mut HashMap<TableId, JoinHandle<()>>,
) {
    let parsed: Result<ClientMsg, _> = serde_json::from_str(text);
    let Ok(msg) = parsed else {
        send_json(
            outbound_tx,
            &ServerMsg::Error {
                code: "INVALID_MESSAGE".to_string(),
                message: "could not parse client message".to_string(),
            },
        )
        .await;
        return;
    };

    match msg {
        ClientMsg::Authenticate { .. } => {}
        ClientMsg::SubscribeTable { table_id } => {
            let handle = spawn_table_forwarder(state, table_id, outbound_tx.clone());
            if let Some(old) = table_forwarders.insert(table_id, handle) {
                old.abort();
            }
            if let Some(snapshot) = state.orchestrator.store.snapshot(table_id).await {
                send_json(
                    outbound_tx,
                    &ServerMsg::TableSnapshot {
                        table_state: snapshot.redacted_for(Some(user_id)),
                    },
                )
                .await;
            }
        }
        ClientMsg::UnsubscribeTable { table_id } => {
            if let Some(handle) = table_forwarders.remove(&table_id) {
                handle.abort();
            }
        }
        ClientMsg::Action { table_id, action } => {
            let result = state
                .orchestrator
                .submit_action(table_id, user_id.clone(), action)
                .await;
            send_json(
                outbound_tx,
                &ServerMsg::ActionResult {
                    accepted: result.is_ok(),
                    reason: result.err().map(|e| e.code().to_string()),
                },
            )
            .await;
        }
        ClientMsg::ChatSend { table_id, text } => {
            if state.orchestrator.store.is_muted(table_id, user_id).await {
                send_json(
                    outbound_tx,
                    &ServerMsg::Error {
                        code: "MUTED".to_string(),
                        message: "you are muted on this table".to_string(),
                    },
                )
                .await;
                return;
            }
            state
                .orchestrator
                .bus
                .publish_table(
                    table_id,
                    ServerMsg::ChatReceived {
                        table_id,
                        user_id: user_id.0.clone(),
                        text,
                        timestamp_ms: state.orchestrator.now_ms(),
                    },
                )
                .await;
        }
    }
}

async fn send_json(outbound_tx: &mpsc::Sender<Message>, msg: &ServerMsg) {
    if let Ok(text) = serde_json::to_string(msg) {
        let _ = outbound_tx.send(Message::Text(text)).await;
    }
}
