//! Legal-action derivation and the chip-movement half of `apply_action`.
//! Post-action resolution (fold-win, runout, street advance) lives in
//! `flow.rs`; this module only validates and applies the single action.

use holdem_shared::action::{ActionInput, ActionKind, ActionKindTag, ActionLogEntry, LegalAction};
use holdem_shared::errors::GameError;
use holdem_shared::ids::{ActionId, SeatId};
use holdem_shared::state::{HandState, Seat, SeatStatus, TableState};

pub fn derive_legal_actions(hand: &HandState, seat: &Seat) -> Vec<LegalAction> {
    let round_contribution = hand.round_contributions.get(&seat.seat_id).copied().unwrap_or(0);
    let to_call = hand.current_bet.saturating_sub(round_contribution);
    let max_total = seat.stack + round_contribution;

    let mut legal = vec![LegalAction {
        kind: ActionKindTag::Fold,
        min_amount: None,
        max_amount: None,
    }];

    if to_call == 0 {
        legal.push(LegalAction {
            kind: ActionKindTag::Check,
            min_amount: None,
            max_amount: None,
        });
        if hand.current_bet == 0 {
            legal.push(LegalAction {
                kind: ActionKindTag::Bet,
                min_amount: Some(hand.min_raise.min(seat.stack)),
                max_amount: Some(seat.stack),
            });
        } else {
            push_raise_if_allowed(hand, seat, round_contribution, max_total, &mut legal);
        }
    } else {
        legal.push(LegalAction {
            kind: ActionKindTag::Call,
            min_amount: Some(to_call.min(seat.stack)),
            max_amount: Some(to_call.min(seat.stack)),
        });
        push_raise_if_allowed(hand, seat, round_contribution, max_total, &mut legal);
    }

    legal.push(LegalAction {
        kind: ActionKindTag::AllIn,
        min_amount: Some(max_total),
        max_amount: Some(max_total),
    });

    legal
}

fn push_raise_if_allowed(
    hand: &HandState,
    seat: &Seat,
    _round_contribution: u64,
    max_total: u64,
    legal: &mut Vec<LegalAction>,
) {
    let already_acted = hand.acted_seats.contains(&seat.seat_id);
    if hand.raise_capped && already_acted {
        return;
    }
    let min_total = (hand.current_bet + hand.min_raise).min(max_total);
    if min_total <= hand.current_bet {
        return;
    }
    legal.push(LegalAction {
        kind: ActionKindTag::Raise,
        min_amount: Some(min_total),
        max_amount: Some(max_total),
    });
}

fn validate_amount(legal: &[LegalAction], tag: ActionKindTag, amount: Option<u64>) -> Result<u64, GameError> {
    let entry = legal
        .iter()
        .find(|a| a.kind == tag)
        .ok_or(GameError::IllegalAction)?;
    let amount = amount.ok_or(GameError::MissingAmount)?;
    if let Some(min) = entry.min_amount {
        if amount < min {
            return Err(GameError::AmountTooSmall);
        }
    }
    if let Some(max) = entry.max_amount {
        if amount > max {
            return Err(GameError::AmountTooLarge);
        }
    }
    Ok(amount)
}

/// Apply exactly one action's chip movement and bookkeeping. Does not advance
/// turn/street/showdown; the caller (`flow::resolve_after_action`) does that.
pub fn apply_single_action(
    state: &mut TableState,
    seat_id: SeatId,
    input: ActionInput,
    allow_inactive: bool,
    now_ms: u64,
) -> Result<(), GameError> {
    let hand = state.hand.as_ref().ok_or(GameError::NoHand)?;
    if hand.turn != seat_id {
        return Err(GameError::NotYourTurn);
    }
    if seat_id.0 as usize >= state.seats.len() {
        return Err(GameError::SeatMissing);
    }

    let seat_status = state.seats[seat_id.0 as usize].status;
    let inactive_ok = allow_inactive
        && seat_status == SeatStatus::Disconnected
        && matches!(input, ActionInput::Fold | ActionInput::Check);
    if seat_status != SeatStatus::Active && !inactive_ok {
        return Err(GameError::SeatInactive);
    }

    let legal = derive_legal_actions(state.hand.as_ref().unwrap(), &state.seats[seat_id.0 as usize]);

    let prev_current_bet = state.hand.as_ref().unwrap().current_bet;
    let user_id = state.seats[seat_id.0 as usize].user_id.clone();

    let kind = match input {
        ActionInput::Fold => {
            if !legal.iter().any(|a| a.kind == ActionKindTag::Fold) {
                return Err(GameError::IllegalAction);
            }
            state.seats[seat_id.0 as usize].status = SeatStatus::Folded;
            ActionKind::Fold
        }
        ActionInput::Check => {
            if !legal.iter().any(|a| a.kind == ActionKindTag::Check) {
                return Err(GameError::IllegalAction);
            }
            ActionKind::Check
        }
        ActionInput::Call => {
            if !legal.iter().any(|a| a.kind == ActionKindTag::Call) {
                return Err(GameError::IllegalAction);
            }
            let hand = state.hand.as_ref().unwrap();
            let rc = hand.round_contributions.get(&seat_id).copied().unwrap_or(0);
            let amount = hand
                .current_bet
                .saturating_sub(rc)
                .min(state.seats[seat_id.0 as usize].stack);
            pay_into_pot(state, seat_id, amount);
            ActionKind::Call { amount }
        }
        ActionInput::Bet { amount } => {
            let amount = validate_amount(&legal, ActionKindTag::Bet, Some(amount))?;
            pay_into_pot(state, seat_id, amount);
            let hand = state.hand.as_mut().unwrap();
            hand.current_bet = amount;
            hand.min_raise = amount;
            hand.last_aggressor = Some(seat_id);
            hand.acted_seats.clear();
            hand.acted_seats.insert(seat_id);
            ActionKind::Bet { amount }
        }
        ActionInput::Raise { amount: target_total } => {
            let amount = validate_amount(&legal, ActionKindTag::Raise, Some(target_total))?;
            apply_raise(state, seat_id, amount, prev_current_bet);
            ActionKind::Raise {
                to: amount,
                by: amount.saturating_sub(prev_current_bet),
            }
        }
        ActionInput::AllIn => {
            let max_total = legal
                .iter()
                .find(|a| a.kind == ActionKindTag::AllIn)
                .and_then(|a| a.max_amount)
                .ok_or(GameError::IllegalAction)?;
            if max_total <= state.hand.as_ref().unwrap().current_bet {
                let rc = state.hand.as_ref().unwrap().round_contributions.get(&seat_id).copied().unwrap_or(0);
                let add = max_total.saturating_sub(rc);
                pay_into_pot(state, seat_id, add);
            } else {
                apply_raise(state, seat_id, max_total, prev_current_bet);
            }
            ActionKind::AllIn { amount: max_total }
        }
    };

    if state.seats[seat_id.0 as usize].stack == 0 && state.seats[seat_id.0 as usize].status == SeatStatus::Active {
        state.seats[seat_id.0 as usize].status = SeatStatus::AllIn;
    }
    if state.seats[seat_id.0 as usize].status != SeatStatus::Folded {
        state.hand.as_mut().unwrap().acted_seats.insert(seat_id);
    }

    let pots = super::pots::recompute_pots(
        &state.hand.as_ref().unwrap().total_contributions,
        &state.seats,
    );
    state.hand.as_mut().unwrap().pots = pots;

    state.hand.as_mut().unwrap().actions.push(ActionLogEntry {
        action_id: ActionId::new(),
        hand_id: state.hand.as_ref().unwrap().hand_id,
        seat: seat_id,
        user_id,
        kind,
        timestamp_ms: now_ms,
    });
    state.seats[seat_id.0 as usize].last_action_ms = Some(now_ms);

    Ok(())
}

fn pay_into_pot(state: &mut TableState, seat_id: SeatId, amount: u64) {
    let seat = &mut state.seats[seat_id.0 as usize];
    let paid = amount.min(seat.stack);
    seat.stack -= paid;
    let hand = state.hand.as_mut().unwrap();
    *hand.round_contributions.entry(seat_id).or_insert(0) += paid;
    *hand.total_contributions.entry(seat_id).or_insert(0) += paid;
}

fn apply_raise(state: &mut TableState, seat_id: SeatId, new_total: u64, prev_current_bet: u64) {
    let rc = state.hand.as_ref().unwrap().round_contributions.get(&seat_id).copied().unwrap_or(0);
    let add = new_total.saturating_sub(rc);
    pay_into_pot(state, seat_id, add);

    let hand = state.hand.as_mut().unwrap();
    let raise_size = new_total.saturating_sub(prev_current_bet);
    hand.current_bet = new_total;
    if raise_size >= hand.min_raise {
        hand.min_raise = raise_size;
        hand.last_aggressor = Some(seat_id);
        hand.acted_seats.clear();
        hand.acted_seats.insert(seat_id);
    } else {
        hand.raise_capped = true;
    }
}
