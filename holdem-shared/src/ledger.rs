//! Wire contract for the external Ledger service (§6). The service itself is
//! out of scope; only the request/response shapes and the tri-state outcome
//! are specified here.

use serde::{Deserialize, Serialize};

use crate::ids::{ReservationId, TableId, UserId};

/// Every ledger call resolves to one of three outcomes: a normal response,
/// a transport-level unavailability (treated as "trust and continue" by the
/// orchestrator), or a semantic refusal from the ledger itself.
#[derive(Clone, Debug)]
pub enum LedgerOutcome<T> {
    Ok(T),
    Unavailable,
    Error(String),
}

impl<T> LedgerOutcome<T> {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, LedgerOutcome::Unavailable)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReserveForBuyInRequest {
    pub user_id: UserId,
    pub table_id: TableId,
    pub amount: u64,
    pub idempotency_key: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReserveForBuyInResponse {
    pub reservation_id: ReservationId,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommitReservationRequest {
    pub reservation_id: ReservationId,
    pub idempotency_key: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReleaseReservationRequest {
    pub reservation_id: ReservationId,
    pub reason: String,
    pub idempotency_key: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProcessCashOutRequest {
    pub user_id: UserId,
    pub table_id: TableId,
    pub amount: u64,
    pub idempotency_key: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordContributionRequest {
    pub user_id: UserId,
    pub table_id: TableId,
    pub hand_id: crate::ids::HandId,
    pub amount: u64,
    pub label: ContributionLabel,
    pub idempotency_key: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum ContributionLabel {
    Blind,
    Ante,
    Call,
    Bet,
    Raise,
    AllIn,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PotPayout {
    pub user_id: UserId,
    pub amount: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SettlePotRequest {
    pub table_id: TableId,
    pub hand_id: crate::ids::HandId,
    pub payouts: Vec<PotPayout>,
    pub rake_amount: u64,
    pub idempotency_key: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CancelPotRequest {
    pub table_id: TableId,
    pub hand_id: crate::ids::HandId,
    pub idempotency_key: String,
}

/// Deterministically split a pot's chip amount across its winners, seated
/// closest-to-the-left-of-the-button first for any odd remainder chips
/// (§4.1 pot settlement, scenario 3 in §8).
pub fn calculate_pot_payouts(
    amount: u64,
    winners: &[crate::ids::SeatId],
    button_seat: crate::ids::SeatId,
    seat_count: u8,
) -> Vec<(crate::ids::SeatId, u64)> {
    if winners.is_empty() || seat_count == 0 {
        return Vec::new();
    }
    let n = winners.len() as u64;
    let share = amount / n;
    let mut remainder = amount % n;

    let mut ordered: Vec<crate::ids::SeatId> = winners.to_vec();
    let seat_count = seat_count as u16;
    ordered.sort_by_key(|s| {
        let delta = (s.0 as u16 + seat_count - button_seat.0 as u16 - 1) % seat_count;
        delta
    });

    ordered
        .into_iter()
        .map(|seat| {
            let mut payout = share;
            if remainder > 0 {
                payout += 1;
                remainder -= 1;
            }
            (seat, payout)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SeatId;

    #[test]
    fn splits_evenly_when_divisible() {
        let payouts = calculate_pot_payouts(100, &[SeatId(0), SeatId(1)], SeatId(3), 9);
        assert_eq!(payouts.iter().map(|(_, a)| a).sum::<u64>(), 100);
        assert!(payouts.iter().all(|(_, a)| *a == 50));
    }

    #[test]
    fn odd_chip_goes_to_seat_closest_left_of_button() {
        // amount=5, winners=[2,7], button=5, seatCount=9 -> [{7:3},{2:2}] (§8 scenario 3)
        let payouts = calculate_pot_payouts(5, &[SeatId(2), SeatId(7)], SeatId(5), 9);
        let map: std::collections::BTreeMap<_, _> = payouts.into_iter().collect();
        assert_eq!(map[&SeatId(7)], 3);
        assert_eq!(map[&SeatId(2)], 2);
    }
}
