//! Pot and side-pot recomputation and rake calculation.
//!
//! The teacher's `showdown.rs` only ever awards a single pot — side pots are
//! not modeled there. This module adds the layered-pot computation the spec
//! requires, following the "rising contribution levels" construction
//! described in §4.1.

use std::collections::BTreeSet;

use holdem_shared::ids::SeatId;
use holdem_shared::state::{Pot, Seat, SeatStatus};

/// Recompute `pots` from each seat's total contribution this hand and the
/// current folded set. Distinct positive contribution levels, sorted
/// ascending, each produce one pot layered over the previous.
pub fn recompute_pots(
    total_contributions: &std::collections::BTreeMap<SeatId, u64>,
    seats: &[Seat],
) -> Vec<Pot> {
    let folded: BTreeSet<SeatId> = seats
        .iter()
        .filter(|s| s.status == SeatStatus::Folded)
        .map(|s| s.seat_id)
        .collect();

    let mut levels: Vec<u64> = total_contributions
        .values()
        .copied()
        .filter(|&v| v > 0)
        .collect();
    levels.sort_unstable();
    levels.dedup();

    let mut pots = Vec::new();
    let mut floor = 0u64;
    for &level in &levels {
        let delta = level - floor;
        let contributors: Vec<SeatId> = total_contributions
            .iter()
            .filter(|(_, &amt)| amt >= level)
            .map(|(seat, _)| *seat)
            .collect();
        if contributors.is_empty() || delta == 0 {
            continue;
        }
        let amount = delta * contributors.len() as u64;
        let eligible_seats: BTreeSet<SeatId> = contributors
            .into_iter()
            .filter(|s| !folded.contains(s))
            .collect();
        pots.push(Pot {
            amount,
            eligible_seats,
            winners: None,
        });
        floor = level;
    }
    pots
}

/// Rake taken from the hand's total pot: `rake_percent`% of the total,
/// capped at `rake_cap` chips, waived entirely for pots of `rake_min_pot`
/// chips or less (§4.1; values come from the table's `TableConfig`).
pub fn calculate_rake(total_pot: u64, rake_percent: u64, rake_cap: u64, rake_min_pot: u64) -> u64 {
    if total_pot <= rake_min_pot {
        return 0;
    }
    ((total_pot * rake_percent) / 100).min(rake_cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdem_shared::state::Seat;

    fn seat(id: u8, status: SeatStatus) -> Seat {
        let mut s = Seat::empty(SeatId(id));
        s.status = status;
        s
    }

    #[test]
    fn no_folds_makes_one_pot_per_rising_level() {
        let mut contrib = std::collections::BTreeMap::new();
        contrib.insert(SeatId(0), 50);
        contrib.insert(SeatId(1), 100);
        contrib.insert(SeatId(2), 100);
        let seats = vec![
            seat(0, SeatStatus::AllIn),
            seat(1, SeatStatus::Active),
            seat(2, SeatStatus::Active),
        ];
        let pots = recompute_pots(&contrib, &seats);
        assert_eq!(pots.len(), 2);
        assert_eq!(pots[0].amount, 150);
        assert_eq!(pots[0].eligible_seats.len(), 3);
        assert_eq!(pots[1].amount, 100);
        assert_eq!(pots[1].eligible_seats.len(), 2);
    }

    #[test]
    fn rake_waived_under_threshold_and_capped_above() {
        assert_eq!(calculate_rake(20, 5, 5, 20), 0);
        assert_eq!(calculate_rake(21, 5, 5, 20), 1);
        assert_eq!(calculate_rake(1000, 5, 5, 20), 5);
    }
}
