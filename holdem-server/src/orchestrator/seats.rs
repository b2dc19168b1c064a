//! Seat and spectator membership: `joinSeat`, `leaveSeat`, spectator
//! join/leave, `kickPlayer`, `mutePlayer` (§4.4).

use holdem_shared::errors::GameError;
use holdem_shared::events::{BalanceUnavailableAction, EventType};
use holdem_shared::ids::{ReservationId, SeatId, TableId, UserId};
use holdem_shared::ledger::{
    CommitReservationRequest, LedgerOutcome, ProcessCashOutRequest, ReleaseReservationRequest,
    ReserveForBuyInRequest,
};
use holdem_shared::state::{Spectator, SpectatorStatus};
use holdem_shared::state::{SeatStatus};

use super::seat_resolution::resolve_seat_for_user;
use super::Orchestrator;

/// Outcome label recorded for metrics/logging, not returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum JoinOutcome {
    Ok,
    Resumed,
    Idempotent,
    AlreadySeated,
    BalanceUnavailable,
}

impl Orchestrator {
    pub async fn join_seat(
        &self,
        table_id: TableId,
        user_id: UserId,
        seat_id: SeatId,
        buy_in_amount: u64,
    ) -> Result<JoinOutcome, GameError> {
        let _table_guard = self.table_locks.acquire(&table_id).await;

        let (outcome, reservation_key) = self
            .store
            .with_mut(table_id, |entry| -> Result<(JoinOutcome, Option<String>), GameError> {
                if seat_id.0 as usize >= entry.state.seats.len() {
                    return Err(GameError::SeatNotAvailable);
                }
                if let Some(existing) = entry.state.seat_index_of(&user_id) {
                    if existing != seat_id {
                        return Err(GameError::AlreadySeated);
                    }
                    let seat = &entry.state.seats[seat_id.0 as usize];
                    if seat.status != SeatStatus::Reserved {
                        return Ok((JoinOutcome::Idempotent, None));
                    }
                }
                let seat = &mut entry.state.seats[seat_id.0 as usize];
                if seat.status != SeatStatus::Empty && seat.user_id.as_ref() != Some(&user_id) {
                    return Err(GameError::SeatNotAvailable);
                }
                let key = format!("buyin:{}:{}:{}:{}", table_id, seat_id, user_id, uuid::Uuid::new_v4());
                seat.user_id = Some(user_id.clone());
                seat.status = SeatStatus::Reserved;
                seat.pending_buy_in_amount = Some(buy_in_amount);
                seat.buy_in_idempotency_key = Some(key.clone());
                Ok((JoinOutcome::Ok, Some(key)))
            })
            .await
            .ok_or(GameError::TableNotFound)??;

        drop(_table_guard);

        if outcome == JoinOutcome::Idempotent {
            return Ok(outcome);
        }
        let idempotency_key = reservation_key.expect("reserved path always carries a key");

        let _seat_guard = self.seat_locks.acquire(&(table_id, seat_id)).await;
        let reserve = self
            .ledger
            .reserve_for_buy_in(ReserveForBuyInRequest {
                user_id: user_id.clone(),
                table_id,
                amount: buy_in_amount,
                idempotency_key: idempotency_key.clone(),
            })
            .await;

        let final_outcome = match reserve {
            LedgerOutcome::Unavailable => {
                self.finalize_seat(table_id, seat_id, buy_in_amount, None).await?;
                self.publish_event(
                    EventType::BalanceUnavailable,
                    table_id,
                    None,
                    Some(user_id.clone()),
                    Some(seat_id),
                    serde_json::json!({ "action": BalanceUnavailableAction::BuyIn }),
                )
                .await;
                JoinOutcome::BalanceUnavailable
            }
            LedgerOutcome::Error(_) => {
                self.release_seat(table_id, seat_id).await;
                return Err(GameError::InsufficientBalance);
            }
            LedgerOutcome::Ok(resp) => {
                // Persisted now, before the commit call, so a concurrent
                // `leave_seat` racing the buy-in can see and release it
                // (§4.4 leaveSeat step 1).
                self.store
                    .with_mut(table_id, |entry| {
                        entry.state.seats[seat_id.0 as usize].reservation_id = Some(resp.reservation_id);
                    })
                    .await;
                let commit = self
                    .ledger
                    .commit_reservation(CommitReservationRequest {
                        reservation_id: resp.reservation_id,
                        idempotency_key: format!("{}:commit", idempotency_key),
                    })
                    .await;
                match commit {
                    LedgerOutcome::Ok(()) => {
                        self.finalize_seat(table_id, seat_id, buy_in_amount, Some(resp.reservation_id))
                            .await?;
                        JoinOutcome::Ok
                    }
                    _ => {
                        self.release_seat(table_id, seat_id).await;
                        let _ = self
                            .ledger
                            .release_reservation(ReleaseReservationRequest {
                                reservation_id: resp.reservation_id,
                                reason: "commit_failed".to_string(),
                                idempotency_key: format!("{}:release", idempotency_key),
                            })
                            .await;
                        return Err(GameError::InsufficientBalance);
                    }
                }
            }
        };

        self.publish_snapshot(table_id).await;
        self.publish_event(
            EventType::PlayerJoined,
            table_id,
            None,
            Some(user_id),
            Some(seat_id),
            serde_json::json!({ "buy_in_amount": buy_in_amount }),
        )
        .await;
        self.maybe_start_hand(table_id).await;

        Ok(final_outcome)
    }

    async fn finalize_seat(
        &self,
        table_id: TableId,
        seat_id: SeatId,
        amount: u64,
        _reservation_id: Option<ReservationId>,
    ) -> Result<(), GameError> {
        self.store
            .with_mut(table_id, |entry| {
                let seat = &mut entry.state.seats[seat_id.0 as usize];
                seat.stack = amount;
                seat.status = SeatStatus::Seated;
                seat.pending_buy_in_amount = None;
                seat.buy_in_idempotency_key = None;
                entry.state.version += 1;
            })
            .await
            .ok_or(GameError::TableLost)
    }

    async fn release_seat(&self, table_id: TableId, seat_id: SeatId) {
        self.store
            .with_mut(table_id, |entry| {
                entry.state.seats[seat_id.0 as usize] = holdem_shared::state::Seat::empty(seat_id);
                entry.state.version += 1;
            })
            .await;
    }

    pub async fn leave_seat(&self, table_id: TableId, user_id: UserId) -> Result<(), GameError> {
        let _guard = self.table_locks.acquire(&table_id).await;

        let (remaining_stack, seat_id, held_turn, pending_reservation) = self
            .store
            .with_mut(table_id, |entry| -> Result<(u64, SeatId, bool, Option<ReservationId>), GameError> {
                let seat_id = resolve_seat_for_user(&entry.state, &user_id)
                    .ok_or(GameError::PlayerNotAtTable)?;
                let stack = entry.state.seats[seat_id.0 as usize].stack;
                let held_turn = entry
                    .state
                    .hand
                    .as_ref()
                    .map(|h| h.turn == seat_id)
                    .unwrap_or(false);
                let pending_reservation = entry.state.seats[seat_id.0 as usize].reservation_id.take();

                let participating = entry.state.hand.is_some()
                    && matches!(
                        entry.state.seats[seat_id.0 as usize].status,
                        SeatStatus::Active | SeatStatus::AllIn
                    );
                if participating {
                    entry.state.seats[seat_id.0 as usize].status = SeatStatus::Folded;
                    let total_contributions = entry.state.hand.as_ref().unwrap().total_contributions.clone();
                    let pots = crate::engine::pots::recompute_pots(&total_contributions, &entry.state.seats);
                    entry.state.hand.as_mut().unwrap().pots = pots;
                }
                entry.state.seats[seat_id.0 as usize].user_id = None;
                entry.state.seats[seat_id.0 as usize].status = SeatStatus::Empty;
                entry.state.seats[seat_id.0 as usize].stack = 0;
                entry.state.version += 1;
                Ok((stack, seat_id, held_turn, pending_reservation))
            })
            .await
            .ok_or(GameError::TableNotFound)??;

        drop(_guard);

        if let Some(reservation_id) = pending_reservation {
            let _ = self
                .ledger
                .release_reservation(ReleaseReservationRequest {
                    reservation_id,
                    reason: "player_left".to_string(),
                    idempotency_key: format!("release:{}:{}:player_left", table_id, reservation_id),
                })
                .await;
        }

        if remaining_stack > 0 {
            let outcome = self
                .ledger
                .process_cash_out(ProcessCashOutRequest {
                    user_id: user_id.clone(),
                    table_id,
                    amount: remaining_stack,
                    idempotency_key: format!("cashout:{}:{}:{}:{}", table_id, user_id, seat_id, uuid::Uuid::new_v4()),
                })
                .await;
            match outcome {
                LedgerOutcome::Unavailable => {
                    self.publish_event(
                        EventType::BalanceUnavailable,
                        table_id,
                        None,
                        Some(user_id.clone()),
                        Some(seat_id),
                        serde_json::json!({ "action": BalanceUnavailableAction::CashOut }),
                    )
                    .await;
                }
                LedgerOutcome::Error(_) => {
                    self.publish_event(
                        EventType::CashoutFailed,
                        table_id,
                        None,
                        Some(user_id.clone()),
                        Some(seat_id),
                        serde_json::Value::Null,
                    )
                    .await;
                }
                LedgerOutcome::Ok(()) => {}
            }
        }

        self.publish_snapshot(table_id).await;
        self.publish_event(
            EventType::PlayerLeft,
            table_id,
            None,
            Some(user_id),
            Some(seat_id),
            serde_json::Value::Null,
        )
        .await;
        self.advance_turn_if_vacated(table_id, seat_id, held_turn).await;
        Ok(())
    }

    pub async fn join_spectator(&self, table_id: TableId, user_id: UserId) -> Result<(), GameError> {
        let now = self.now_ms();
        self.store
            .with_mut(table_id, |entry| {
                if !entry.state.spectators.iter().any(|s| s.user_id == user_id) {
                    entry.state.spectators.push(Spectator {
                        user_id: user_id.clone(),
                        status: SpectatorStatus::Watching,
                        joined_at_ms: now,
                    });
                }
            })
            .await
            .ok_or(GameError::TableNotFound)?;
        self.publish_snapshot(table_id).await;
        self.publish_event(
            EventType::SpectatorJoined,
            table_id,
            None,
            Some(user_id),
            None,
            serde_json::Value::Null,
        )
        .await;
        Ok(())
    }

    pub async fn leave_spectator(&self, table_id: TableId, user_id: UserId) -> Result<(), GameError> {
        self.store
            .with_mut(table_id, |entry| {
                entry.state.spectators.retain(|s| s.user_id != user_id);
            })
            .await
            .ok_or(GameError::TableNotFound)?;
        self.publish_snapshot(table_id).await;
        self.publish_event(
            EventType::SpectatorLeft,
            table_id,
            None,
            Some(user_id),
            None,
            serde_json::Value::Null,
        )
        .await;
        Ok(())
    }

    pub async fn kick_player(
        &self,
        table_id: TableId,
        owner_id: UserId,
        target_user_id: UserId,
    ) -> Result<(), GameError> {
        let table = self.get_table(table_id).await?;
        if table.owner_id != owner_id {
            return Err(GameError::NotAuthorized);
        }
        self.leave_seat(table_id, target_user_id.clone()).await?;
        self.publish_event(
            EventType::PlayerKicked,
            table_id,
            None,
            Some(target_user_id),
            None,
            serde_json::Value::Null,
        )
        .await;
        Ok(())
    }

    pub async fn mute_player(
        &self,
        table_id: TableId,
        owner_id: UserId,
        target_user_id: UserId,
        muted: bool,
    ) -> Result<(), GameError> {
        let table = self.get_table(table_id).await?;
        if table.owner_id != owner_id {
            return Err(GameError::NotAuthorized);
        }
        self.store
            .with_mut(table_id, |entry| {
                if muted {
                    entry.muted.insert(target_user_id.clone());
                } else {
                    entry.muted.remove(&target_user_id);
                }
            })
            .await
            .ok_or(GameError::TableNotFound)?;
        self.publish_event(
            if muted {
                EventType::PlayerMuted
            } else {
                EventType::PlayerUnmuted
            },
            table_id,
            None,
            Some(target_user_id),
            None,
            serde_json::Value::Null,
        )
        .await;
        Ok(())
    }
}
