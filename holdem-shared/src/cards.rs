//! Card primitives: a 52-card deck, ranks 2..Ace, four suits.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Card rank, ordered low to high so `as u8` gives a natural 2..14 value
/// once offset by [`CardRank::value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardRank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl CardRank {
    pub const ALL: [CardRank; 13] = [
        CardRank::Two,
        CardRank::Three,
        CardRank::Four,
        CardRank::Five,
        CardRank::Six,
        CardRank::Seven,
        CardRank::Eight,
        CardRank::Nine,
        CardRank::Ten,
        CardRank::Jack,
        CardRank::Queen,
        CardRank::King,
        CardRank::Ace,
    ];

    /// High value used for hand ranking (2..14, Ace high).
    pub fn value(self) -> u8 {
        self as u8 + 2
    }

    pub fn from_index(i: u8) -> Self {
        Self::ALL[i as usize]
    }

    pub fn short(self) -> &'static str {
        match self {
            CardRank::Two => "2",
            CardRank::Three => "3",
            CardRank::Four => "4",
            CardRank::Five => "5",
            CardRank::Six => "6",
            CardRank::Seven => "7",
            CardRank::Eight => "8",
            CardRank::Nine => "9",
            CardRank::Ten => "T",
            CardRank::Jack => "J",
            CardRank::Queen => "Q",
            CardRank::King => "K",
            CardRank::Ace => "A",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardSuit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl CardSuit {
    pub const ALL: [CardSuit; 4] = [
        CardSuit::Clubs,
        CardSuit::Diamonds,
        CardSuit::Hearts,
        CardSuit::Spades,
    ];

    pub fn as_usize(self) -> usize {
        self as usize
    }

    pub fn icon(self) -> char {
        match self {
            CardSuit::Clubs => '♣',
            CardSuit::Diamonds => '♦',
            CardSuit::Hearts => '♥',
            CardSuit::Spades => '♠',
        }
    }

    pub fn is_red(self) -> bool {
        matches!(self, CardSuit::Hearts | CardSuit::Diamonds)
    }
}

/// A card packed into a single byte: `suit * 13 + rank_index`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card(pub u8);

impl Card {
    pub fn new(rank: CardRank, suit: CardSuit) -> Self {
        Card((suit as u8) * 13 + rank as u8)
    }

    pub fn rank(self) -> CardRank {
        CardRank::from_index(self.0 % 13)
    }

    pub fn suit(self) -> CardSuit {
        CardSuit::ALL[(self.0 / 13) as usize]
    }

    /// All 52 cards in a fixed canonical order (clubs 2..A, diamonds 2..A, ...).
    pub fn full_deck() -> Vec<Card> {
        (0..52).map(Card).collect()
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank().short(), self.suit().icon())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank().short(), self.suit().icon())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_rank_and_suit() {
        for &suit in &CardSuit::ALL {
            for &rank in &CardRank::ALL {
                let c = Card::new(rank, suit);
                assert_eq!(c.rank(), rank);
                assert_eq!(c.suit(), suit);
            }
        }
    }

    #[test]
    fn full_deck_has_52_distinct_cards() {
        let deck = Card::full_deck();
        assert_eq!(deck.len(), 52);
        let mut seen = std::collections::HashSet::new();
        for c in deck {
            assert!(seen.insert(c.0));
        }
    }
}
