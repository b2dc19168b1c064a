//! Error taxonomy shared by the orchestrator, the RPC adapter, and the engine.
//!
//! §7 of the design splits errors into domain (user-actionable), transient,
//! consistency, and fatal buckets. Keeping them as one enum lets the RPC
//! adapter map every variant to a status code in one place.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    // --- Domain (user-actionable) ---
    #[error("table not found")]
    TableNotFound,
    #[error("seat not available")]
    SeatNotAvailable,
    #[error("already seated")]
    AlreadySeated,
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("no hand in progress")]
    NoHandInProgress,
    #[error("player not at table")]
    PlayerNotAtTable,
    #[error("invalid action")]
    InvalidAction,
    #[error("illegal action")]
    IllegalAction,
    #[error("missing amount")]
    MissingAmount,
    #[error("amount too small")]
    AmountTooSmall,
    #[error("amount too large")]
    AmountTooLarge,
    #[error("hand already complete")]
    HandComplete,
    #[error("seat is inactive")]
    SeatInactive,
    #[error("not authorized")]
    NotAuthorized,
    #[error("not your turn")]
    NotYourTurn,
    #[error("unknown seat")]
    SeatMissing,
    #[error("no active hand")]
    NoHand,
    #[error("missing idempotency key")]
    MissingIdempotencyKey,

    // --- Transient ---
    #[error("idempotent request already in progress")]
    IdempotencyInProgress,

    // --- Consistency ---
    #[error("table disappeared mid-operation")]
    TableLost,
    #[error("seat disappeared mid-operation")]
    SeatLost,

    // --- Fatal ---
    #[error("internal error: {0}")]
    Internal(String),
}

impl GameError {
    /// SCREAMING_SNAKE_CASE wire code for the RPC adapter's JSON error body
    /// and for event/metric labels (§7).
    pub fn code(&self) -> &'static str {
        match self {
            GameError::TableNotFound => "TABLE_NOT_FOUND",
            GameError::SeatNotAvailable => "SEAT_NOT_AVAILABLE",
            GameError::AlreadySeated => "ALREADY_SEATED",
            GameError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            GameError::NoHandInProgress => "NO_HAND_IN_PROGRESS",
            GameError::PlayerNotAtTable => "PLAYER_NOT_AT_TABLE",
            GameError::InvalidAction => "INVALID_ACTION",
            GameError::IllegalAction => "ILLEGAL_ACTION",
            GameError::MissingAmount => "MISSING_AMOUNT",
            GameError::AmountTooSmall => "AMOUNT_TOO_SMALL",
            GameError::AmountTooLarge => "AMOUNT_TOO_LARGE",
            GameError::HandComplete => "HAND_COMPLETE",
            GameError::SeatInactive => "SEAT_INACTIVE",
            GameError::NotAuthorized => "NOT_AUTHORIZED",
            GameError::NotYourTurn => "NOT_YOUR_TURN",
            GameError::SeatMissing => "SEAT_MISSING",
            GameError::NoHand => "NO_HAND",
            GameError::MissingIdempotencyKey => "MISSING_IDEMPOTENCY_KEY",
            GameError::IdempotencyInProgress => "IDEMPOTENCY_IN_PROGRESS",
            GameError::TableLost => "TABLE_LOST",
            GameError::SeatLost => "SEAT_LOST",
            GameError::Internal(_) => "INTERNAL",
        }
    }

    /// Coarse bucket, used by the RPC adapter for status mapping and by
    /// metrics for low-cardinality labels.
    pub fn kind(&self) -> &'static str {
        match self {
            GameError::TableNotFound
            | GameError::SeatNotAvailable
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
            | GameError::NotAuthorized
            | GameError::NotYourTurn
            | GameError::SeatMissing
            | GameError::NoHand
            | GameError::MissingIdempotencyKey => "domain",
            GameError::IdempotencyInProgress => "transient",
            GameError::TableLost | GameError::SeatLost => "consistency",
            GameError::Internal(_) => "fatal",
        }
    }
}
