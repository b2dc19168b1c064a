//! Hand start: button rotation, blind/ante posting, hole card dealing.

use holdem_shared::action::{ActionKind, ActionLogEntry, BlindKind};
use holdem_shared::cards::Card;
use holdem_shared::errors::GameError;
use holdem_shared::ids::{ActionId, HandId, SeatId};
use holdem_shared::state::{HandState, SeatStatus, Street, TableState};
use holdem_shared::table::TableConfig;

use super::deck;
use super::pots::recompute_pots;

fn is_eligible(state: &TableState, seat_id: SeatId) -> bool {
    let s = &state.seats[seat_id.0 as usize];
    s.status != SeatStatus::Empty
        && s.status != SeatStatus::Reserved
        && s.user_id.is_some()
        && s.stack > 0
}

fn eligible_seats(state: &TableState) -> Vec<SeatId> {
    state
        .seats
        .iter()
        .filter(|s| is_eligible(state, s.seat_id))
        .map(|s| s.seat_id)
        .collect()
}

/// The next eligible seat strictly after `from`, wrapping around the table.
fn next_eligible_after(state: &TableState, from: SeatId) -> Option<SeatId> {
    let n = state.seats.len() as u8;
    for offset in 1..=n {
        let idx = (from.0 + offset) % n;
        if is_eligible(state, SeatId(idx)) {
            return Some(SeatId(idx));
        }
    }
    None
}

/// `next ACTIVE after` lookup used post-deal, once seats are ACTIVE/ALL_IN.
pub(super) fn next_active_after(state: &TableState, from: SeatId) -> Option<SeatId> {
    let n = state.seats.len() as u8;
    for offset in 1..=n {
        let idx = (from.0 + offset) % n;
        if state.seats[idx as usize].status == SeatStatus::Active {
            return Some(SeatId(idx));
        }
    }
    None
}

pub fn start_hand(
    state: &mut TableState,
    config: &TableConfig,
    now_ms: u64,
    deck_override: Option<Vec<Card>>,
) -> Result<(), GameError> {
    let eligible = eligible_seats(state);
    if eligible.len() < 2 {
        return Err(GameError::NoHand);
    }

    let button = if is_eligible(state, state.button) {
        next_eligible_after(state, state.button).unwrap_or(eligible[0])
    } else {
        eligible[0]
    };
    let button = if eligible.contains(&button) { button } else { eligible[0] };
    state.button = button;

    let heads_up = eligible.len() == 2;
    let sb_seat = if heads_up {
        button
    } else {
        next_eligible_after(state, button).unwrap_or(button)
    };
    let bb_seat = next_eligible_after(state, sb_seat).unwrap_or(sb_seat);

    let hand_id = HandId::new();
    let mut round_contributions = std::collections::BTreeMap::new();
    let mut total_contributions = std::collections::BTreeMap::new();
    let mut actions = Vec::new();

    if config.ante > 0 {
        for &seat_id in &eligible {
            let seat = &mut state.seats[seat_id.0 as usize];
            let amount = config.ante.min(seat.stack);
            seat.stack -= amount;
            *total_contributions.entry(seat_id).or_insert(0u64) += amount;
            actions.push(ActionLogEntry {
                action_id: ActionId::new(),
                hand_id,
                seat: seat_id,
                user_id: seat.user_id.clone(),
                kind: ActionKind::PostAnte { amount },
                timestamp_ms: now_ms,
            });
            if seat.stack == 0 {
                seat.status = SeatStatus::AllIn;
            }
        }
    }

    let post_blind = |state: &mut TableState,
                      seat_id: SeatId,
                      kind: BlindKind,
                      amount: u64,
                      actions: &mut Vec<ActionLogEntry>,
                      round_contributions: &mut std::collections::BTreeMap<SeatId, u64>,
                      total_contributions: &mut std::collections::BTreeMap<SeatId, u64>| {
        let seat = &mut state.seats[seat_id.0 as usize];
        let paid = amount.min(seat.stack);
        seat.stack -= paid;
        *round_contributions.entry(seat_id).or_insert(0) += paid;
        *total_contributions.entry(seat_id).or_insert(0) += paid;
        actions.push(ActionLogEntry {
            action_id: ActionId::new(),
            hand_id,
            seat: seat_id,
            user_id: seat.user_id.clone(),
            kind: ActionKind::PostBlind { kind, amount: paid },
            timestamp_ms: now_ms,
        });
        if seat.stack == 0 {
            seat.status = SeatStatus::AllIn;
        }
    };

    post_blind(
        state,
        sb_seat,
        BlindKind::SmallBlind,
        config.small_blind,
        &mut actions,
        &mut round_contributions,
        &mut total_contributions,
    );
    post_blind(
        state,
        bb_seat,
        BlindKind::BigBlind,
        config.big_blind,
        &mut actions,
        &mut round_contributions,
        &mut total_contributions,
    );

    let mut deck = deck_override
        .unwrap_or_else(|| deck::shuffled_deck_with_seed(deck::derive_seed(state.table_id, now_ms)));

    for &seat_id in &eligible {
        let seat = &mut state.seats[seat_id.0 as usize];
        let c1 = deck.remove(0);
        let c2 = deck.remove(0);
        seat.hole_cards = Some([c1, c2]);
        if seat.status != SeatStatus::AllIn {
            seat.status = SeatStatus::Active;
        }
    }

    let turn = next_active_after(state, bb_seat).unwrap_or(bb_seat);

    let pots = recompute_pots(&total_contributions, &state.seats);

    state.hand = Some(HandState {
        hand_id,
        table_id: state.table_id,
        street: Street::Preflop,
        community_cards: Vec::new(),
        deck,
        pots,
        current_bet: config.big_blind,
        min_raise: config.big_blind,
        big_blind: config.big_blind,
        turn,
        last_aggressor: Some(bb_seat),
        round_contributions,
        total_contributions,
        acted_seats: std::collections::BTreeSet::new(),
        raise_capped: false,
        actions,
        rake_amount: 0,
        started_at_ms: now_ms,
        ended_at_ms: None,
        winners: None,
        payouts: std::collections::BTreeMap::new(),
        timed_out: false,
    });

    Ok(())
}
