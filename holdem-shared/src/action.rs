//! Player action inputs and the legal-action sets the engine derives from them.

use serde::{Deserialize, Serialize};

use crate::ids::{ActionId, HandId, SeatId, UserId};

/// What a player is attempting to do. Modeled as a tagged union so the
/// engine's legality checks operate on structured data rather than strings;
/// transports parse the wire string into this shape at the boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionInput {
    Fold,
    Check,
    Call,
    Bet { amount: u64 },
    Raise { amount: u64 },
    AllIn,
}

impl ActionInput {
    pub fn type_name(&self) -> &'static str {
        match self {
            ActionInput::Fold => "FOLD",
            ActionInput::Check => "CHECK",
            ActionInput::Call => "CALL",
            ActionInput::Bet { .. } => "BET",
            ActionInput::Raise { .. } => "RAISE",
            ActionInput::AllIn => "ALL_IN",
        }
    }
}

/// A single legal action the engine offers for the seat to act, with its
/// amount bounds when the action is amount-bearing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalAction {
    pub kind: ActionKindTag,
    pub min_amount: Option<u64>,
    pub max_amount: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKindTag {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    AllIn,
}

/// Richer action record kept in the hand's action log. Distinct from
/// `ActionInput` because it also records the kind of blind post and the
/// resolved chip amount, not just the player's request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ActionKind {
    PostBlind { kind: BlindKind, amount: u64 },
    PostAnte { amount: u64 },
    Fold,
    Check,
    Call { amount: u64 },
    Bet { amount: u64 },
    Raise { to: u64, by: u64 },
    AllIn { amount: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlindKind {
    SmallBlind,
    BigBlind,
}

/// One entry in `HandState::actions`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub action_id: ActionId,
    pub hand_id: HandId,
    pub seat: SeatId,
    pub user_id: Option<UserId>,
    pub kind: ActionKind,
    pub timestamp_ms: u64,
}
