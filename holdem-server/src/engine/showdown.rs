//! Hand-ending chip movement: fold-win award and full showdown resolution.

use holdem_shared::hand_rank::HandResult;
use holdem_shared::ids::SeatId;
use holdem_shared::ledger::calculate_pot_payouts;
use holdem_shared::state::{SeatStatus, TableState};
use holdem_shared::table::TableConfig;

use super::pots::calculate_rake;
use super::ranking::{evaluate_best_hand, pick_best_five};

/// Award every chip in play to the single remaining (non-folded) seat. No
/// hand comparison is evaluated — the winner is whoever didn't fold — but a
/// `HandResult` is still recorded against `hand.winners` (best-five derived
/// from whatever hole/community cards exist) so `HAND_ENDED`'s `winners` /
/// `winner_user_ids` are never empty on a fold-win (§4.4/§6).
pub fn award_fold_win(state: &mut TableState, config: &TableConfig, winner: SeatId, now_ms: u64) {
    let total: u64 = state.hand.as_ref().unwrap().pots.iter().map(|p| p.amount).sum();
    let rake = calculate_rake(total, config.rake_percent, config.rake_cap, config.rake_min_pot);
    let payout = total.saturating_sub(rake);

    let hole = state.seats[winner.0 as usize].hole_cards.unwrap();
    let community = state.hand.as_ref().unwrap().community_cards.clone();
    let result = HandResult {
        seat: winner,
        rank: evaluate_best_hand(hole, &community),
        best_five: pick_best_five(hole, &community),
    };

    let hand = state.hand.as_mut().unwrap();
    for pot in &mut hand.pots {
        pot.winners = Some(vec![winner]);
    }
    hand.rake_amount = rake;
    hand.ended_at_ms = Some(now_ms);
    hand.payouts.insert(winner, payout);
    hand.winners = Some(vec![result]);

    state.seats[winner.0 as usize].stack += payout;
}

/// Evaluate every non-folded seat's best hand, award each pot to its
/// eligible winners (splitting ties per `calculate_pot_payouts`), and record
/// the rake taken from the main pot.
pub fn resolve_showdown(state: &mut TableState, config: &TableConfig, now_ms: u64) {
    let button = state.button;
    let seat_count = state.seats.len() as u8;

    let contenders: Vec<(SeatId, [holdem_shared::cards::Card; 2])> = state
        .seats
        .iter()
        .filter(|s| matches!(s.status, SeatStatus::Active | SeatStatus::AllIn))
        .filter_map(|s| s.hole_cards.map(|hc| (s.seat_id, hc)))
        .collect();

    let community = state.hand.as_ref().unwrap().community_cards.clone();

    let mut results: Vec<HandResult> = contenders
        .iter()
        .map(|(seat, hole)| HandResult {
            seat: *seat,
            rank: evaluate_best_hand(*hole, &community),
            best_five: pick_best_five(*hole, &community),
        })
        .collect();
    results.sort_by(|a, b| a.rank.cmp(&b.rank));

    let total: u64 = state.hand.as_ref().unwrap().pots.iter().map(|p| p.amount).sum();
    let rake = calculate_rake(total, config.rake_percent, config.rake_cap, config.rake_min_pot);
    let mut rake_remaining = rake;

    let hand = state.hand.as_mut().unwrap();
    for pot in &mut hand.pots {
        let mut eligible_results: Vec<&HandResult> = results
            .iter()
            .filter(|r| pot.eligible_seats.contains(&r.seat))
            .collect();
        eligible_results.sort_by(|a, b| b.rank.cmp(&a.rank));
        let best = match eligible_results.first() {
            Some(r) => r.rank.clone(),
            None => continue,
        };
        let winners: Vec<SeatId> = eligible_results
            .iter()
            .take_while(|r| r.rank == best)
            .map(|r| r.seat)
            .collect();

        let take = rake_remaining.min(pot.amount);
        rake_remaining -= take;
        let payable = pot.amount - take;

        let payouts = calculate_pot_payouts(payable, &winners, button, seat_count);
        for (seat, amount) in &payouts {
            state.seats[seat.0 as usize].stack += amount;
            *hand.payouts.entry(*seat).or_insert(0) += amount;
        }
        pot.winners = Some(winners);
    }

    let hand = state.hand.as_mut().unwrap();
    hand.rake_amount = rake;
    hand.ended_at_ms = Some(now_ms);
    hand.winners = Some(results);
}
