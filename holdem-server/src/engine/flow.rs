//! Post-action resolution: the pipeline that runs after every applied action
//! decides whether the hand ends (fold-win or showdown), the street advances,
//! or the turn simply passes to the next active seat.

use holdem_shared::errors::GameError;
use holdem_shared::events::HandOutcome;
use holdem_shared::ids::SeatId;
use holdem_shared::state::{SeatStatus, Street, TableState};
use holdem_shared::table::TableConfig;

use super::dealing::next_active_after;
use super::showdown;

pub enum EngineEvent {
    TurnAdvanced,
    StreetAdvanced,
    HandEnded { outcome: HandOutcome },
}

fn non_folded_seats(state: &TableState) -> Vec<SeatId> {
    state
        .seats
        .iter()
        .filter(|s| matches!(s.status, SeatStatus::Active | SeatStatus::AllIn))
        .map(|s| s.seat_id)
        .collect()
}

fn active_seats(state: &TableState) -> Vec<SeatId> {
    state
        .seats
        .iter()
        .filter(|s| s.status == SeatStatus::Active)
        .map(|s| s.seat_id)
        .collect()
}

fn betting_round_complete(state: &TableState) -> bool {
    let hand = state.hand.as_ref().unwrap();
    let active = active_seats(state);
    if hand.current_bet == 0 {
        active.iter().all(|s| hand.acted_seats.contains(s))
    } else {
        active.iter().all(|s| {
            hand.acted_seats.contains(s)
                && hand.round_contributions.get(s).copied().unwrap_or(0) >= hand.current_bet
        })
    }
}

fn deal_one(state: &mut TableState) {
    let hand = state.hand.as_mut().unwrap();
    if let Some(card) = hand.deck.first().copied() {
        hand.deck.remove(0);
        hand.community_cards.push(card);
    }
}

fn start_new_betting_round(state: &mut TableState, config: &TableConfig) {
    let hand = state.hand.as_mut().unwrap();
    hand.round_contributions.clear();
    hand.current_bet = 0;
    hand.min_raise = config.big_blind;
    hand.raise_capped = false;
    hand.acted_seats.clear();
    let button = state.button;
    hand.turn = next_active_after(state, button).unwrap_or(button);
}

/// Steps (a)-(b) of the post-action pipeline: fold-win and all-in runout.
/// Shared by `resolve_after_action` and `check_hand_ended_without_turn_advance`
/// since both must end the hand the same way regardless of whether a real
/// action or a seat departure triggered the check.
fn resolve_hand_end(state: &mut TableState, config: &TableConfig, now_ms: u64) -> Option<EngineEvent> {
    let remaining = non_folded_seats(state);

    // (a) fold win
    if remaining.len() == 1 {
        let winner = remaining[0];
        showdown::award_fold_win(state, config, winner, now_ms);
        return Some(EngineEvent::HandEnded {
            outcome: HandOutcome::FoldWin,
        });
    }

    let active = active_seats(state);

    // (b) runout: not enough live actors to keep betting
    if active.is_empty() || (active.len() == 1 && remaining.len() > 1) {
        while state.hand.as_ref().unwrap().community_cards.len() < 5 {
            deal_one(state);
        }
        state.hand.as_mut().unwrap().street = Street::Showdown;
        showdown::resolve_showdown(state, config, now_ms);
        return Some(EngineEvent::HandEnded {
            outcome: HandOutcome::Showdown,
        });
    }

    None
}

/// Checks only the hand-ending conditions (a)-(b) of the post-action
/// pipeline without touching `hand.turn`. Used when a seat vacates the
/// table without holding the current turn (§4.4 leaveSeat): the departure
/// can still end the hand (e.g. it was the last non-folded opponent), but
/// must never skip the seat that is legitimately on the clock the way the
/// full pipeline's step (c) would.
pub fn check_hand_ended_without_turn_advance(
    state: &mut TableState,
    config: &TableConfig,
    now_ms: u64,
) -> Option<EngineEvent> {
    resolve_hand_end(state, config, now_ms)
}

/// Runs steps (a)-(e) of the post-action pipeline. Returns the outcome the
/// orchestrator needs to decide what to publish/emit next.
pub fn resolve_after_action(
    state: &mut TableState,
    config: &TableConfig,
    now_ms: u64,
) -> Result<EngineEvent, GameError> {
    if let Some(event) = resolve_hand_end(state, config, now_ms) {
        return Ok(event);
    }

    // (c) betting round still open
    if !betting_round_complete(state) {
        let hand = state.hand.as_mut().unwrap();
        let current_turn = hand.turn;
        hand.turn = next_active_after(state, current_turn).unwrap_or(current_turn);
        return Ok(EngineEvent::TurnAdvanced);
    }

    let street = state.hand.as_ref().unwrap().street;

    // (d) river betting closed -> showdown
    if street == Street::River {
        state.hand.as_mut().unwrap().street = Street::Showdown;
        showdown::resolve_showdown(state, config, now_ms);
        return Ok(EngineEvent::HandEnded {
            outcome: HandOutcome::Showdown,
        });
    }

    // (e) advance to the next street
    let next_street = match street {
        Street::Preflop => Street::Flop,
        Street::Flop => Street::Turn,
        Street::Turn => Street::River,
        Street::River | Street::Showdown => unreachable!("river/showdown handled above"),
    };
    let deal_count = match next_street {
        Street::Flop => 3,
        Street::Turn | Street::River => 1,
        _ => 0,
    };
    for _ in 0..deal_count {
        deal_one(state);
    }
    state.hand.as_mut().unwrap().street = next_street;
    start_new_betting_round(state, config);
    Ok(EngineEvent::StreetAdvanced)
}
