//! Hand ranking result types shared between the engine and its clients.

use serde::{Deserialize, Serialize};

use crate::cards::Card;

/// Categories of 5-card poker hands, ordered weakest to strongest so the
/// derived `Ord` impl compares categories correctly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HandRankCategory {
    HighCard,
    Pair,
    TwoPair,
    ThreeKind,
    Straight,
    Flush,
    FullHouse,
    FourKind,
    StraightFlush,
}

/// Complete ranking for a 5-card hand: category plus tiebreaker values
/// (high to low) used to break ties within the same category.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandRank {
    pub category: HandRankCategory,
    pub tiebreakers: Vec<u8>,
}

/// The outcome of evaluating one seat's hand at showdown.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HandResult {
    pub seat: crate::ids::SeatId,
    pub rank: HandRank,
    pub best_five: [Card; 5],
}
