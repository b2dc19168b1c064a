//! Best-5-of-7 hand evaluation. Ported from the teacher's `poker::evaluation`
//! module; the category/tiebreaker representation is unchanged, only the
//! concrete `Card`/`HandRank` types (now `holdem_shared`'s) differ.

use holdem_shared::cards::{Card, CardSuit};
use holdem_shared::hand_rank::{HandRank, HandRankCategory};

const NUM_SUITS: usize = 4;
const RANK_COUNT_ARRAY_SIZE: usize = 15;

pub fn evaluate_best_hand(hole: [Card; 2], community: &[Card]) -> HandRank {
    let mut cards = Vec::with_capacity(7);
    cards.push(hole[0]);
    cards.push(hole[1]);
    cards.extend_from_slice(community);
    best_rank_from_seven(&cards)
}

/// Enumerate all 5-card combinations from the 2..7 available cards and
/// return the highest-ranked subset, for presentation at showdown.
pub fn pick_best_five(hole: [Card; 2], community: &[Card]) -> [Card; 5] {
    let mut all = Vec::with_capacity(7);
    all.push(hole[0]);
    all.push(hole[1]);
    all.extend_from_slice(community);

    if all.len() < 5 {
        all.sort_unstable_by_key(|c| std::cmp::Reverse(c.rank().value()));
        let mut out = [hole[0]; 5];
        let n = all.len().min(5);
        out[..n].copy_from_slice(&all[..n]);
        return out;
    }

    let n = all.len();
    let mut best_rank: Option<HandRank> = None;
    let mut best_combo = [hole[0]; 5];
    for i in 0..(n - 4) {
        for j in (i + 1)..(n - 3) {
            for k in (j + 1)..(n - 2) {
                for l in (k + 1)..(n - 1) {
                    for m in (l + 1)..n {
                        let subset = [all[i], all[j], all[k], all[l], all[m]];
                        let rank = best_rank_from_seven(&subset);
                        if best_rank.as_ref().map(|r| &rank > r).unwrap_or(true) {
                            best_rank = Some(rank);
                            best_combo = subset;
                        }
                    }
                }
            }
        }
    }
    best_combo
}

fn best_rank_from_seven(cards: &[Card]) -> HandRank {
    let flush_suit = analyze_suits_for_flush(cards);

    if let Some(sflush) = check_straight_flush(cards, flush_suit) {
        return sflush;
    }
    let (counts, all_values) = analyze_card_values(cards);
    if let Some(r) = check_four_of_a_kind(&counts, &all_values) {
        return r;
    }
    if let Some(r) = check_full_house(&counts) {
        return r;
    }
    if let Some(r) = check_flush(cards, flush_suit) {
        return r;
    }
    if let Some(r) = check_straight(cards) {
        return r;
    }
    if let Some(r) = check_three_of_a_kind(&counts, &all_values) {
        return r;
    }
    if let Some(r) = check_two_pair(&counts, &all_values) {
        return r;
    }
    if let Some(r) = check_one_pair(&counts, &all_values) {
        return r;
    }
    check_high_card(&all_values)
}

fn by_suit(cards: &[Card]) -> [Vec<Card>; NUM_SUITS] {
    let mut suit_cards: [Vec<Card>; NUM_SUITS] = [vec![], vec![], vec![], vec![]];
    for &c in cards {
        suit_cards[c.suit().as_usize()].push(c);
    }
    suit_cards
}

fn analyze_suits_for_flush(cards: &[Card]) -> Option<u8> {
    let suit_cards = by_suit(cards);
    (0..NUM_SUITS)
        .find(|&s| suit_cards[s].len() >= 5)
        .map(|s| s as u8)
}

fn analyze_card_values(cards: &[Card]) -> ([u8; RANK_COUNT_ARRAY_SIZE], Vec<u8>) {
    let mut counts = [0u8; RANK_COUNT_ARRAY_SIZE];
    let mut all_values = Vec::with_capacity(cards.len());
    for &c in cards {
        let v = c.rank().value();
        counts[v as usize] += 1;
        all_values.push(v);
    }
    (counts, all_values)
}

fn check_straight_flush(cards: &[Card], flush_suit: Option<u8>) -> Option<HandRank> {
    let fs = flush_suit?;
    let suit_cards = by_suit(cards);
    let values = ranks_as_values_unique(&suit_cards[fs as usize]);
    straight_high(&values).map(|high| HandRank {
        category: HandRankCategory::StraightFlush,
        tiebreakers: vec![high],
    })
}

fn check_four_of_a_kind(counts: &[u8; RANK_COUNT_ARRAY_SIZE], all_values: &[u8]) -> Option<HandRank> {
    find_n_of_a_kind(counts, 4, all_values).map(|(quad, kicker)| HandRank {
        category: HandRankCategory::FourKind,
        tiebreakers: vec![quad, kicker],
    })
}

fn check_full_house(counts: &[u8; RANK_COUNT_ARRAY_SIZE]) -> Option<HandRank> {
    find_full_house(counts).map(|(trip, pair)| HandRank {
        category: HandRankCategory::FullHouse,
        tiebreakers: vec![trip, pair],
    })
}

fn check_flush(cards: &[Card], flush_suit: Option<u8>) -> Option<HandRank> {
    let fs = flush_suit?;
    let suit_cards = by_suit(cards);
    let mut vs: Vec<u8> = suit_cards[fs as usize].iter().map(|c| c.rank().value()).collect();
    vs.sort_unstable_by(|a, b| b.cmp(a));
    vs.truncate(5);
    Some(HandRank {
        category: HandRankCategory::Flush,
        tiebreakers: vs,
    })
}

fn check_straight(cards: &[Card]) -> Option<HandRank> {
    let values = ranks_as_values_unique(cards);
    straight_high(&values).map(|high| HandRank {
        category: HandRankCategory::Straight,
        tiebreakers: vec![high],
    })
}

fn check_three_of_a_kind(counts: &[u8; RANK_COUNT_ARRAY_SIZE], all_values: &[u8]) -> Option<HandRank> {
    find_n_kind_with_kickers(counts, all_values, 3, 2).map(|(trip, kickers)| {
        let mut t = vec![trip];
        t.extend(kickers);
        HandRank {
            category: HandRankCategory::ThreeKind,
            tiebreakers: t,
        }
    })
}

fn check_two_pair(counts: &[u8; RANK_COUNT_ARRAY_SIZE], all_values: &[u8]) -> Option<HandRank> {
    find_two_pair(counts, all_values).map(|(hi, lo, kicker)| HandRank {
        category: HandRankCategory::TwoPair,
        tiebreakers: vec![hi, lo, kicker],
    })
}

fn check_one_pair(counts: &[u8; RANK_COUNT_ARRAY_SIZE], all_values: &[u8]) -> Option<HandRank> {
    find_n_kind_with_kickers(counts, all_values, 2, 3).map(|(pair, kickers)| {
        let mut t = vec![pair];
        t.extend(kickers);
        HandRank {
            category: HandRankCategory::Pair,
            tiebreakers: t,
        }
    })
}

fn check_high_card(all_values: &[u8]) -> HandRank {
    let mut highs = all_values.to_vec();
    highs.sort_unstable_by(|a, b| b.cmp(a));
    highs.dedup();
    highs.truncate(5);
    HandRank {
        category: HandRankCategory::HighCard,
        tiebreakers: highs,
    }
}

fn ranks_as_values_unique(cards: &[Card]) -> Vec<u8> {
    let mut v: Vec<u8> = cards.iter().map(|c| c.rank().value()).collect();
    v.sort_unstable();
    v.dedup();
    v
}

/// Highest straight in a sorted-ascending, deduplicated set of rank values
/// (2..14). Recognises the ace-low wheel (A-2-3-4-5) as straight-high 5.
fn straight_high(values_unique_sorted_asc: &[u8]) -> Option<u8> {
    if values_unique_sorted_asc.is_empty() {
        return None;
    }
    let mut present = [false; RANK_COUNT_ARRAY_SIZE];
    for &v in values_unique_sorted_asc {
        if (2..=14).contains(&v) {
            present[v as usize] = true;
        }
    }
    if present[14] {
        present[1] = true;
    }

    let mut best: Option<u8> = None;
    let mut run_len = 0usize;
    let mut last_v = 0usize;
    for v in (1..=14).rev() {
        if present[v] {
            if last_v == 0 || v + 1 == last_v {
                run_len += 1;
            } else {
                run_len = 1;
            }
            if run_len >= 5 {
                let high = (v + 4) as u8;
                if best.map(|b| high > b).unwrap_or(true) {
                    best = Some(high);
                }
            }
            last_v = v;
        } else {
            run_len = 0;
            last_v = 0;
        }
    }
    best
}

fn find_n_of_a_kind(counts: &[u8; RANK_COUNT_ARRAY_SIZE], n: u8, all_values: &[u8]) -> Option<(u8, u8)> {
    let rank = (2..=14).rev().find(|&v| counts[v] == n)? as u8;
    let mut kickers: Vec<u8> = all_values.iter().copied().filter(|&v| v != rank).collect();
    kickers.sort_unstable_by(|a, b| b.cmp(a));
    kickers.first().map(|&k| (rank, k))
}

fn find_full_house(counts: &[u8; RANK_COUNT_ARRAY_SIZE]) -> Option<(u8, u8)> {
    let mut trips = vec![];
    let mut pairs = vec![];
    for v in (2..=14).rev() {
        if counts[v] >= 3 {
            trips.push(v as u8);
        } else if counts[v] >= 2 {
            pairs.push(v as u8);
        }
    }
    let trip = *trips.first()?;
    let pair = pairs.first().copied().or_else(|| trips.get(1).copied());
    pair.map(|p| (trip, p))
}

fn find_n_kind_with_kickers(
    counts: &[u8; RANK_COUNT_ARRAY_SIZE],
    all_values: &[u8],
    n: u8,
    kicker_count: usize,
) -> Option<(u8, Vec<u8>)> {
    let rank = (2..=14).rev().find(|&v| counts[v] == n)? as u8;
    let mut kickers: Vec<u8> = all_values.iter().copied().filter(|&v| v != rank).collect();
    kickers.sort_unstable_by(|a, b| b.cmp(a));
    kickers.dedup();
    kickers.truncate(kicker_count);
    Some((rank, kickers))
}

fn find_two_pair(counts: &[u8; RANK_COUNT_ARRAY_SIZE], all_values: &[u8]) -> Option<(u8, u8, u8)> {
    let mut pairs = vec![];
    for v in (2..=14).rev() {
        if counts[v] >= 2 {
            pairs.push(v as u8);
        }
    }
    if pairs.len() < 2 {
        return None;
    }
    let (hi, lo) = (pairs[0], pairs[1]);
    let mut kickers: Vec<u8> = all_values.iter().copied().filter(|&v| v != hi && v != lo).collect();
    kickers.sort_unstable_by(|a, b| b.cmp(a));
    kickers.dedup();
    Some((hi, lo, kickers.first().copied().unwrap_or(2)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdem_shared::cards::CardRank;

    fn c(rank: CardRank, suit: CardSuit) -> Card {
        Card::new(rank, suit)
    }

    #[test]
    fn recognises_ace_low_wheel_straight() {
        let hole = [c(CardRank::Ace, CardSuit::Spades), c(CardRank::Two, CardSuit::Diamonds)];
        let community = [
            c(CardRank::Three, CardSuit::Clubs),
            c(CardRank::Four, CardSuit::Spades),
            c(CardRank::Five, CardSuit::Hearts),
        ];
        let rank = evaluate_best_hand(hole, &community);
        assert_eq!(rank.category, HandRankCategory::Straight);
        assert_eq!(rank.tiebreakers, vec![5]);
    }

    #[test]
    fn straight_flush_beats_quads() {
        let sf_hole = [c(CardRank::Nine, CardSuit::Clubs), c(CardRank::Eight, CardSuit::Clubs)];
        let sf_community = [
            c(CardRank::Seven, CardSuit::Clubs),
            c(CardRank::Six, CardSuit::Clubs),
            c(CardRank::Five, CardSuit::Clubs),
        ];
        let sf = evaluate_best_hand(sf_hole, &sf_community);

        let quad_hole = [c(CardRank::King, CardSuit::Clubs), c(CardRank::King, CardSuit::Diamonds)];
        let quad_community = [
            c(CardRank::King, CardSuit::Hearts),
            c(CardRank::King, CardSuit::Spades),
            c(CardRank::Two, CardSuit::Clubs),
        ];
        let quad = evaluate_best_hand(quad_hole, &quad_community);

        assert!(sf > quad);
    }
}
