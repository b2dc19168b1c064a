//! Integration tests for the RPC adapter (C8): drives the real axum router
//! with `tower::ServiceExt::oneshot`, no network socket involved.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use holdem_server::broadcast::BroadcastBus;
use holdem_server::config::Config;
use holdem_server::ledger::InProcessLedger;
use holdem_server::orchestrator::Orchestrator;
use holdem_server::server::build_router;
use holdem_server::store::TableStore;

fn test_router() -> axum::Router {
    let orchestrator = Orchestrator::new(
        TableStore::new(),
        BroadcastBus::new(),
        Arc::new(InProcessLedger),
        Config::default(),
    );
    build_router(orchestrator)
}

async fn send(
    router: &axum::Router,
    method: Method,
    uri: &str,
    user_id: Option<&str>,
    idempotency_key: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(u) = user_id {
        builder = builder.header("X-User-Id", u);
    }
    if let Some(k) = idempotency_key {
        builder = builder.header("Idempotency-Key", k);
    }
    let request_body = match &body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(v).unwrap())
        }
        None => Body::empty(),
    };
    let request = builder.body(request_body).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn create_table_then_fetch_it() {
    let router = test_router();

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/tables",
        Some("alice"),
        Some("create-1"),
        Some(json!({
            "name": "Friday Night",
            "config": {
                "small_blind": 1,
                "big_blind": 2,
                "ante": 0,
                "max_players": 9,
                "starting_stack": 200,
                "turn_timer_seconds": 20,
                "rake_percent": 5,
                "rake_cap": 5,
                "rake_min_pot": 20
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let table_id = body["table_id"].as_str().unwrap().to_string();
    assert_eq!(body["name"], "Friday Night");
    assert_eq!(body["status"], "Waiting");

    let (status, body) = send(
        &router,
        Method::GET,
        &format!("/api/tables/{table_id}"),
        None,
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["table_id"], table_id);
}

#[tokio::test]
async fn create_table_is_idempotent_on_retry() {
    let router = test_router();
    let req = json!({
        "name": "Idempotent Table",
        "config": {
            "small_blind": 1, "big_blind": 2, "ante": 0, "max_players": 9,
            "starting_stack": 200, "turn_timer_seconds": 20,
            "rake_percent": 5, "rake_cap": 5, "rake_min_pot": 20
        }
    });

    let (status1, body1) = send(
        &router,
        Method::POST,
        "/api/tables",
        Some("alice"),
        Some("dupe-key"),
        Some(req.clone()),
    )
    .await;
    let (status2, body2) = send(
        &router,
        Method::POST,
        "/api/tables",
        Some("alice"),
        Some("dupe-key"),
        Some(req),
    )
    .await;

    assert_eq!(status1, StatusCode::OK);
    assert_eq!(status2, StatusCode::OK);
    // Same idempotency key returns the exact same table id, not a second table.
    assert_eq!(body1["table_id"], body2["table_id"]);
}

#[tokio::test]
async fn missing_idempotency_key_is_rejected() {
    let router = test_router();
    let (status, body) = send(
        &router,
        Method::POST,
        "/api/tables",
        Some("alice"),
        None,
        Some(json!({
            "name": "No Key",
            "config": {
                "small_blind": 1, "big_blind": 2, "ante": 0, "max_players": 9,
                "starting_stack": 200, "turn_timer_seconds": 20,
                "rake_percent": 5, "rake_cap": 5, "rake_min_pot": 20
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "MISSING_IDEMPOTENCY_KEY");
}

#[tokio::test]
async fn get_table_state_redacts_hole_cards_for_non_owner() {
    let router = test_router();

    let (_, created) = send(
        &router,
        Method::POST,
        "/api/tables",
        Some("alice"),
        Some("create-2"),
        Some(json!({
            "name": "Heads Up",
            "config": {
                "small_blind": 1, "big_blind": 2, "ante": 0, "max_players": 2,
                "starting_stack": 100, "turn_timer_seconds": 20,
                "rake_percent": 5, "rake_cap": 5, "rake_min_pot": 20
            }
        })),
    )
    .await;
    let table_id = created["table_id"].as_str().unwrap().to_string();

    for (user, seat, key) in [("alice", 0, "join-a"), ("bob", 1, "join-b")] {
        let (status, _) = send(
            &router,
            Method::POST,
            &format!("/api/tables/{table_id}/join"),
            Some(user),
            Some(key),
            Some(json!({ "seat_id": seat, "buy_in_amount": 100 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "join failed for {user}");
    }

    // A hand should have auto-started once both seats were funded.
    let (status, state) = send(
        &router,
        Method::GET,
        &format!("/api/tables/{table_id}/state"),
        Some("carol"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(state["hand"].is_object(), "expected a hand to have started");
    for seat in state["seats"].as_array().unwrap() {
        if seat["user_id"].is_string() {
            assert!(seat["hole_cards"].is_null(), "hole cards leaked to a non-owner viewer");
            assert!(seat["reservation_id"].is_null());
            assert!(seat["pending_buy_in_amount"].is_null());
            assert!(seat["buy_in_idempotency_key"].is_null());
        }
    }

    // The owning viewer does see their own hole cards.
    let (status, state) = send(
        &router,
        Method::GET,
        &format!("/api/tables/{table_id}/state"),
        Some("alice"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let alice_seat = state["seats"][0].clone();
    assert!(alice_seat["hole_cards"].is_array(), "owner should see their own hole cards");
    let bob_seat = state["seats"][1].clone();
    assert!(bob_seat["hole_cards"].is_null(), "other seat stays redacted");
}

#[tokio::test]
async fn heads_up_fold_awards_the_pot_to_the_other_seat() {
    let router = test_router();

    let (_, created) = send(
        &router,
        Method::POST,
        "/api/tables",
        Some("alice"),
        Some("create-3"),
        Some(json!({
            "name": "Heads Up Fold",
            "config": {
                "small_blind": 1, "big_blind": 2, "ante": 0, "max_players": 2,
                "starting_stack": 100, "turn_timer_seconds": 20,
                "rake_percent": 5, "rake_cap": 5, "rake_min_pot": 20
            }
        })),
    )
    .await;
    let table_id = created["table_id"].as_str().unwrap().to_string();

    for (user, seat, key) in [("alice", 0, "join-a3"), ("bob", 1, "join-b3")] {
        let (status, _) = send(
            &router,
            Method::POST,
            &format!("/api/tables/{table_id}/join"),
            Some(user),
            Some(key),
            Some(json!({ "seat_id": seat, "buy_in_amount": 100 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // Heads-up: the button (seat 0 / alice) posts the small blind and acts
    // first preflop (§4.1). Folding there ends the hand immediately.
    let (status, _) = send(
        &router,
        Method::POST,
        &format!("/api/tables/{table_id}/action"),
        Some("alice"),
        Some("action-fold"),
        Some(json!({ "type": "FOLD" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, state) = send(
        &router,
        Method::GET,
        &format!("/api/tables/{table_id}/state"),
        None,
        None,
        None,
    )
    .await;
    assert!(state["hand"].is_null(), "hand should have ended and cleared");
    let alice_stack = state["seats"][0]["stack"].as_u64().unwrap();
    let bob_stack = state["seats"][1]["stack"].as_u64().unwrap();
    // Total chips in play are conserved; no rake under the 20-chip minimum.
    assert_eq!(alice_stack + bob_stack, 200);
    assert_eq!(alice_stack, 99);
    assert_eq!(bob_stack, 101);
}

#[tokio::test]
async fn acting_out_of_turn_is_rejected() {
    let router = test_router();
    let (_, created) = send(
        &router,
        Method::POST,
        "/api/tables",
        Some("alice"),
        Some("create-4"),
        Some(json!({
            "name": "Turn Order",
            "config": {
                "small_blind": 1, "big_blind": 2, "ante": 0, "max_players": 2,
                "starting_stack": 100, "turn_timer_seconds": 20,
                "rake_percent": 5, "rake_cap": 5, "rake_min_pot": 20
            }
        })),
    )
    .await;
    let table_id = created["table_id"].as_str().unwrap().to_string();
    for (user, seat, key) in [("alice", 0, "join-a4"), ("bob", 1, "join-b4")] {
        send(
            &router,
            Method::POST,
            &format!("/api/tables/{table_id}/join"),
            Some(user),
            Some(key),
            Some(json!({ "seat_id": seat, "buy_in_amount": 100 })),
        )
        .await;
    }

    // Heads-up, button (alice) acts first: bob acting now is out of turn.
    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/api/tables/{table_id}/action"),
        Some("bob"),
        Some("action-oot"),
        Some(json!({ "type": "CHECK" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "NOT_YOUR_TURN");
}

#[tokio::test]
async fn deleting_an_unknown_table_is_not_found() {
    let router = test_router();
    let (status, body) = send(
        &router,
        Method::DELETE,
        &format!("/api/tables/{}", uuid::Uuid::new_v4()),
        None,
        Some("del-1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "TABLE_NOT_FOUND");
}

#[tokio::test]
async fn lobby_lists_created_tables() {
    let router = test_router();
    send(
        &router,
        Method::POST,
        "/api/tables",
        Some("alice"),
        Some("create-5"),
        Some(json!({
            "name": "Lobby Table",
            "config": {
                "small_blind": 1, "big_blind": 2, "ante": 0, "max_players": 6,
                "starting_stack": 200, "turn_timer_seconds": 20,
                "rake_percent": 5, "rake_cap": 5, "rake_min_pot": 20
            }
        })),
    )
    .await;

    let (status, body) = send(&router, Method::GET, "/api/tables", None, None, None).await;
    assert_eq!(status, StatusCode::OK);
    let tables = body.as_array().unwrap();
    assert!(tables.iter().any(|t| t["name"] == "Lobby Table"));
}
