//! Seat lookup for a given user, used by `submit_action` and `leave_seat`
//! when a user could plausibly be resolved to more than one seat (reconnect
//! edge cases). `join_seat` never uses this — it always addresses the exact
//! requested seat id.
//!
//! Resolution order (§4.7): the seat currently on the clock, then the seat
//! holding two hole cards, then any seat still live in the hand, then the
//! first matching seat by id.

use holdem_shared::ids::{SeatId, UserId};
use holdem_shared::state::{SeatStatus, TableState};

pub fn resolve_seat_for_user(state: &TableState, user_id: &UserId) -> Option<SeatId> {
    let candidates: Vec<SeatId> = state
        .seats
        .iter()
        .filter(|s| s.user_id.as_ref() == Some(user_id))
        .map(|s| s.seat_id)
        .collect();

    if candidates.is_empty() {
        return None;
    }
    if candidates.len() == 1 {
        return Some(candidates[0]);
    }

    if let Some(hand) = &state.hand {
        if candidates.contains(&hand.turn) {
            return Some(hand.turn);
        }
        if let Some(seat) = candidates
            .iter()
            .find(|&&s| state.seats[s.0 as usize].hole_cards.is_some())
        {
            return Some(*seat);
        }
        if let Some(seat) = candidates.iter().find(|&&s| {
            matches!(
                state.seats[s.0 as usize].status,
                SeatStatus::Active | SeatStatus::AllIn | SeatStatus::Folded
            )
        }) {
            return Some(*seat);
        }
    }

    candidates.into_iter().min_by_key(|s| s.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdem_shared::ids::TableId;
    use holdem_shared::state::Seat;

    #[test]
    fn single_match_resolves_directly() {
        let mut state = TableState::new(TableId::new(), 4);
        let user = UserId("u1".into());
        state.seats[2] = Seat {
            user_id: Some(user.clone()),
            ..Seat::empty(SeatId(2))
        };
        assert_eq!(resolve_seat_for_user(&state, &user), Some(SeatId(2)));
    }

    #[test]
    fn no_match_returns_none() {
        let state = TableState::new(TableId::new(), 4);
        let user = UserId("ghost".into());
        assert_eq!(resolve_seat_for_user(&state, &user), None);
    }
}
