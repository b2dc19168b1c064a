//! Integration tests for the gateway multiplexer (C9): a real TCP listener
//! plus `tokio-tungstenite` as the client, exercising the actual WebSocket
//! handshake and framing instead of calling handler functions directly.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use holdem_server::broadcast::BroadcastBus;
use holdem_server::config::Config;
use holdem_server::ledger::InProcessLedger;
use holdem_server::orchestrator::Orchestrator;
use holdem_server::server::build_router;
use holdem_server::store::TableStore;

async fn spawn_test_server() -> String {
    let orchestrator = Orchestrator::new(
        TableStore::new(),
        BroadcastBus::new(),
        Arc::new(InProcessLedger),
        Config::default(),
    );
    let router = build_router(orchestrator);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("ws://{addr}/ws")
}

async fn next_json(
    stream: &mut tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
) -> Value {
    use futures_util::StreamExt;
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("timed out waiting for a server message")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).expect("server sent invalid JSON");
        }
    }
}

#[tokio::test]
async fn query_token_auth_gets_a_welcome_message() {
    let base = spawn_test_server().await;
    let url = format!("{base}?token=alice");
    let (mut ws, _) = tokio_tungstenite::connect_async(url).await.unwrap();

    let welcome = next_json(&mut ws).await;
    assert_eq!(welcome["type"], "WELCOME");
    assert_eq!(welcome["user_id"], "alice");
    assert!(welcome["connection_id"].is_string());
}

#[tokio::test]
async fn in_protocol_authenticate_also_works() {
    use futures_util::SinkExt;

    let base = spawn_test_server().await;
    let (mut ws, _) = tokio_tungstenite::connect_async(&base).await.unwrap();

    ws.send(Message::Text(
        json!({ "type": "AUTHENTICATE", "token": "bob" }).to_string(),
    ))
    .await
    .unwrap();

    let welcome = next_json(&mut ws).await;
    assert_eq!(welcome["type"], "WELCOME");
    assert_eq!(welcome["user_id"], "bob");
}

#[tokio::test]
async fn subscribing_to_a_table_sends_an_immediate_snapshot() {
    let base = spawn_test_server().await;

    // Create a table over the plain HTTP surface first.
    let http_base = base
        .replacen("ws://", "http://", 1)
        .trim_end_matches("/ws")
        .to_string();
    let client = reqwest::Client::new();
    let created: Value = client
        .post(format!("{http_base}/api/tables"))
        .header("X-User-Id", "alice")
        .header("Idempotency-Key", "ws-create-1")
        .json(&json!({
            "name": "WS Table",
            "config": {
                "small_blind": 1, "big_blind": 2, "ante": 0, "max_players": 2,
                "starting_stack": 100, "turn_timer_seconds": 20,
                "rake_percent": 5, "rake_cap": 5, "rake_min_pot": 20
            }
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let table_id = created["table_id"].as_str().unwrap().to_string();

    let url = format!("{base}?token=alice");
    let (mut ws, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    let _welcome = next_json(&mut ws).await;

    use futures_util::SinkExt;
    ws.send(Message::Text(
        json!({ "type": "SUBSCRIBE_TABLE", "table_id": table_id }).to_string(),
    ))
    .await
    .unwrap();

    let snapshot = next_json(&mut ws).await;
    assert_eq!(snapshot["type"], "TABLE_SNAPSHOT");
    assert_eq!(snapshot["table_state"]["table_id"], table_id);
}

#[tokio::test]
async fn no_auth_within_deadline_closes_with_code_1008() {
    use futures_util::StreamExt;

    let base = spawn_test_server().await;
    let (mut ws, _) = tokio_tungstenite::connect_async(&base).await.unwrap();

    // Don't authenticate at all; the server should close us itself. We don't
    // wait the full 5s deadline in this test — instead confirm the socket
    // eventually yields a close frame rather than a welcome message within a
    // generous bound.
    let result: Option<u16> = tokio::time::timeout(Duration::from_secs(7), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(frame))) => return frame.map(|f| u16::from(f.code)),
                Some(Ok(_)) => continue,
                Some(Err(_)) | None => return None,
            }
        }
    })
    .await
    .expect("server never closed the unauthenticated connection");

    assert_eq!(result, Some(1008u16));
}
