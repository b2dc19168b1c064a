//! Deterministic deck shuffling. The teacher shuffles with `rand::seq::SliceRandom`
//! seeded from the OS RNG in production and a test-only `shuffled_deck_with_seed`
//! helper; here determinism is load-bearing (replay is a tested property), so
//! production shuffling also goes through the seeded LCG.

use holdem_shared::cards::Card;

/// A small linear congruential generator; same constants as POSIX `rand48`.
/// Not cryptographically secure, which is fine for a play-money shuffle that
/// must be reproducible from a seed.
struct Lcg(u64);

impl Lcg {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }
}

/// Derive a 64-bit seed from a table id and the hand's start timestamp, per
/// the default shuffle seed source.
pub fn derive_seed(table_id: holdem_shared::ids::TableId, now_ms: u64) -> u64 {
    let (hi, lo) = table_id.0.as_u64_pair();
    hi ^ lo.rotate_left(17) ^ now_ms
}

/// Fisher-Yates shuffle of the full 52-card deck using `seed`.
pub fn shuffled_deck_with_seed(seed: u64) -> Vec<Card> {
    let mut deck = Card::full_deck();
    let mut rng = Lcg(seed ^ 0x9E3779B97F4A7C15);
    for i in (1..deck.len()).rev() {
        let j = rng.gen_range(i + 1);
        deck.swap(i, j);
    }
    deck
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_yields_identical_deck() {
        let a = shuffled_deck_with_seed(42);
        let b = shuffled_deck_with_seed(42);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_usually_differ() {
        let a = shuffled_deck_with_seed(1);
        let b = shuffled_deck_with_seed(2);
        assert_ne!(a, b);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let deck = shuffled_deck_with_seed(7);
        assert_eq!(deck.len(), 52);
        let mut seen = std::collections::HashSet::new();
        for c in deck {
            assert!(seen.insert(c.0));
        }
    }
}
