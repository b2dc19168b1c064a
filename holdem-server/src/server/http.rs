//! RPC adapter (spec component C8): the axum HTTP surface over the
//! orchestrator. Every mutating route requires an `Idempotency-Key` header
//! and runs through `AppState::idempotency` (§4.9); identity comes from an
//! `X-User-Id` header, the reference stand-in for the out-of-scope OIDC
//! layer named in Non-goals.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use holdem_shared::action::ActionInput;
use holdem_shared::errors::GameError;
use holdem_shared::ids::{TableId, UserId};
use holdem_shared::state::TableState;
use holdem_shared::table::{Table, TableConfig, TableSummary};

use super::idempotency::{TTL_MODERATION, TTL_SEAT_ACTION, TTL_TABLE_LIFECYCLE};
use super::state::AppState;
use crate::orchestrator::seats::JoinOutcome;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/tables", get(list_tables).post(create_table))
        .route("/api/tables/:id", get(get_table).delete(delete_table))
        .route("/api/tables/:id/state", get(get_table_state))
        .route("/api/tables/:id/join", post(join_seat))
        .route("/api/tables/:id/leave", post(leave_seat))
        .route(
            "/api/tables/:id/spectate",
            post(join_spectator).delete(leave_spectator),
        )
        .route("/api/tables/:id/action", post(submit_action))
        .route("/api/tables/:id/kick", post(kick_player))
        .route("/api/tables/:id/mute", post(mute_player))
}

async fn health() -> &'static str {
    "ok"
}

fn game_error_status(err: &GameError) -> StatusCode {
    match err {
        GameError::TableNotFound => StatusCode::NOT_FOUND,
        GameError::NotAuthorized => StatusCode::FORBIDDEN,
        GameError::MissingIdempotencyKey => StatusCode::BAD_REQUEST,
        GameError::IdempotencyInProgress => StatusCode::SERVICE_UNAVAILABLE,
        GameError::SeatNotAvailable
        | GameError::AlreadySeated
        | GameError::InsufficientBalance
        | GameError::NoHandInProgress
        | GameError::PlayerNotAtTable
        | GameError::InvalidAction
        | GameError::IllegalAction
        | GameError::MissingAmount
        | GameError::AmountTooSmall
        | GameError::AmountTooLarge
        | GameError::HandComplete
        | GameError::SeatInactive
        | GameError::NotYourTurn
        | GameError::SeatMissing
        | GameError::NoHand => StatusCode::BAD_REQUEST,
        GameError::TableLost | GameError::SeatLost => StatusCode::CONFLICT,
        GameError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorBody>)>;

fn err_response(err: GameError) -> (StatusCode, Json<ErrorBody>) {
    let body = ErrorBody {
        error: err.code().to_string(),
        message: err.to_string(),
    };
    (game_error_status(&err), Json(body))
}

fn user_id_of(headers: &HeaderMap) -> Result<UserId, (StatusCode, Json<ErrorBody>)> {
    headers
        .get("X-User-Id")
        .and_then(|v| v.to_str().ok())
        .map(|s| UserId(s.to_string()))
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody {
                    error: "UNAUTHENTICATED".to_string(),
                    message: "missing X-User-Id header".to_string(),
                }),
            )
        })
}

fn idempotency_key_of(headers: &HeaderMap) -> Result<String, (StatusCode, Json<ErrorBody>)> {
    headers
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| err_response(GameError::MissingIdempotencyKey))
}

#[derive(Deserialize)]
struct CreateTableRequest {
    name: String,
    config: TableConfig,
}

async fn create_table(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateTableRequest>,
) -> ApiResult<Table> {
    let owner_id = user_id_of(&headers)?;
    let key = idempotency_key_of(&headers)?;
    let orchestrator = state.orchestrator.clone();
    let result = state
        .idempotency
        .run("createTable", &key, TTL_TABLE_LIFECYCLE, async move {
            orchestrator.create_table(req.name, owner_id, req.config).await
        })
        .await;
    result.map(Json).map_err(err_response)
}

async fn list_tables(State(state): State<AppState>) -> Json<Vec<TableSummary>> {
    Json(state.orchestrator.list_tables().await)
}

async fn get_table(State(state): State<AppState>, Path(id): Path<uuid::Uuid>) -> ApiResult<Table> {
    state
        .orchestrator
        .get_table(TableId(id))
        .await
        .map(Json)
        .map_err(err_response)
}

async fn delete_table(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    let key = idempotency_key_of(&headers)?;
    let orchestrator = state.orchestrator.clone();
    state
        .idempotency
        .run("deleteTable", &key, TTL_TABLE_LIFECYCLE, async move {
            orchestrator.delete_table(TableId(id)).await
        })
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(err_response)
}

async fn get_table_state(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    headers: HeaderMap,
) -> ApiResult<TableState> {
    let viewer = user_id_of(&headers).ok();
    state
        .orchestrator
        .get_table_state(TableId(id), viewer.as_ref())
        .await
        .map(Json)
        .map_err(err_response)
}

#[derive(Deserialize)]
struct JoinSeatRequest {
    seat_id: u8,
    buy_in_amount: u64,
}

#[derive(Serialize)]
struct JoinSeatResponse {
    outcome: &'static str,
}

async fn join_seat(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    headers: HeaderMap,
    Json(req): Json<JoinSeatRequest>,
) -> ApiResult<JoinSeatResponse> {
    let user_id = user_id_of(&headers)?;
    let key = idempotency_key_of(&headers)?;
    let orchestrator = state.orchestrator.clone();
    let seat_id = holdem_shared::ids::SeatId(req.seat_id);
    let result = state
        .idempotency
        .run("joinSeat", &key, TTL_SEAT_ACTION, async move {
            orchestrator
                .join_seat(TableId(id), user_id, seat_id, req.buy_in_amount)
                .await
        })
        .await;
    result
        .map(|outcome| {
            Json(JoinSeatResponse {
                outcome: match outcome {
                    JoinOutcome::Ok => "OK",
                    JoinOutcome::Resumed => "RESUMED",
                    JoinOutcome::Idempotent => "IDEMPOTENT",
                    JoinOutcome::AlreadySeated => "ALREADY_SEATED",
                    JoinOutcome::BalanceUnavailable => "BALANCE_UNAVAILABLE",
                },
            })
        })
        .map_err(err_response)
}

async fn leave_seat(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    let user_id = user_id_of(&headers)?;
    let key = idempotency_key_of(&headers)?;
    let orchestrator = state.orchestrator.clone();
    state
        .idempotency
        .run("leaveSeat", &key, TTL_SEAT_ACTION, async move {
            orchestrator.leave_seat(TableId(id), user_id).await
        })
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(err_response)
}

async fn join_spectator(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    let user_id = user_id_of(&headers)?;
    state
        .orchestrator
        .join_spectator(TableId(id), user_id)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(err_response)
}

async fn leave_spectator(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    let user_id = user_id_of(&headers)?;
    state
        .orchestrator
        .leave_spectator(TableId(id), user_id)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(err_response)
}

async fn submit_action(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    headers: HeaderMap,
    Json(action): Json<ActionInput>,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    let user_id = user_id_of(&headers)?;
    let key = idempotency_key_of(&headers)?;
    let orchestrator = state.orchestrator.clone();
    state
        .idempotency
        .run("submitAction", &key, TTL_SEAT_ACTION, async move {
            orchestrator.submit_action(TableId(id), user_id, action).await
        })
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(err_response)
}

#[derive(Deserialize)]
struct TargetUserRequest {
    user_id: String,
}

async fn kick_player(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    headers: HeaderMap,
    Json(req): Json<TargetUserRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    let owner_id = user_id_of(&headers)?;
    let key = idempotency_key_of(&headers)?;
    let orchestrator = state.orchestrator.clone();
    state
        .idempotency
        .run("kickPlayer", &key, TTL_MODERATION, async move {
            orchestrator
                .kick_player(TableId(id), owner_id, UserId(req.user_id))
                .await
        })
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(err_response)
}

#[derive(Deserialize)]
struct MutePlayerRequest {
    user_id: String,
    muted: bool,
}

async fn mute_player(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    headers: HeaderMap,
    Json(req): Json<MutePlayerRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    let owner_id = user_id_of(&headers)?;
    let key = idempotency_key_of(&headers)?;
    let orchestrator = state.orchestrator.clone();
    state
        .idempotency
        .run("mutePlayer", &key, TTL_MODERATION, async move {
            orchestrator
                .mute_player(TableId(id), owner_id, UserId(req.user_id), req.muted)
                .await
        })
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(err_response)
}
