//! Hand-start and hand-ended pipelines (§4.4 `checkStartHand` / hand-ended),
//! plus the shared post-action bookkeeping every engine-driven mutation
//! routes through (`process_engine_event`).

use std::time::Duration;

use holdem_shared::events::{EventType, HandEndedPayload, HandOutcome};
use holdem_shared::ids::{HandId, SeatId, TableId};
use holdem_shared::ledger::{
    CancelPotRequest, LedgerOutcome, PotPayout, SettlePotRequest,
};
use holdem_shared::state::SeatStatus;
use holdem_shared::table::TableStatus;

use crate::engine::EngineEvent;

use super::Orchestrator;

impl Orchestrator {
    /// Starts a hand if the table is idle and has at least two funded
    /// seated players. A no-op otherwise — callers invoke this optimistically
    /// after every join/leave and after every hand-ended pipeline.
    pub async fn maybe_start_hand(&self, table_id: TableId) {
        let _guard = self.table_locks.acquire(&table_id).await;
        let Some(config) = self.store.config_of(table_id).await else {
            return;
        };
        let now = self.now_ms();

        let started = self
            .store
            .with_mut(table_id, |entry| {
                if entry.table.status == TableStatus::Playing || entry.state.hand.is_some() {
                    return false;
                }
                let eligible = entry
                    .state
                    .seats
                    .iter()
                    .filter(|s| s.status == SeatStatus::Seated && s.stack > 0)
                    .count();
                if eligible < 2 {
                    return false;
                }
                match crate::engine::start_hand(&mut entry.state, &entry.table.config, now, None) {
                    Ok(()) => {
                        entry.table.status = TableStatus::Playing;
                        entry.state.version += 1;
                        entry.state.updated_at_ms = now;
                        true
                    }
                    Err(_) => false,
                }
            })
            .await
            .unwrap_or(false);

        if !started {
            return;
        }

        let hand = self.store.snapshot(table_id).await.and_then(|s| s.hand);
        self.publish_snapshot(table_id).await;
        if let Some(hand) = &hand {
            self.publish_event(
                EventType::HandStarted,
                table_id,
                Some(hand.hand_id),
                None,
                None,
                serde_json::Value::Null,
            )
            .await;
            self.publish_event(
                EventType::PreflopDealt,
                table_id,
                Some(hand.hand_id),
                None,
                None,
                serde_json::Value::Null,
            )
            .await;
            self.start_turn_timer(table_id, hand.hand_id, hand.turn, config.turn_timer_seconds)
                .await;
        }
    }

    /// Re-run the post-action resolution pipeline after a seat vacates
    /// mid-hand (e.g. via `leave_seat`). Only advances `hand.turn` /
    /// restarts the turn timer when the vacated seat actually held the
    /// turn (§4.4 leaveSeat: "if seat held the turn, advance turn to next
    /// ACTIVE and restart turn timer"); otherwise the departure can still
    /// end the hand (fold-win / runout) but must not skip whoever is
    /// legitimately on the clock.
    pub async fn advance_turn_if_vacated(&self, table_id: TableId, _seat_id: SeatId, held_turn: bool) {
        let Some(config) = self.store.config_of(table_id).await else {
            return;
        };
        let now = self.now_ms();
        let _guard = self.table_locks.acquire(&table_id).await;

        let event = self
            .store
            .with_mut(table_id, |entry| {
                if entry.state.hand.is_none() {
                    return None;
                }
                if held_turn {
                    crate::engine::resolve_after_action(&mut entry.state, &config, now).ok()
                } else {
                    crate::engine::check_hand_ended_without_turn_advance(&mut entry.state, &config, now)
                }
            })
            .await
            .flatten();

        drop(_guard);

        if let Some(event) = event {
            self.process_engine_event(table_id, event).await;
        }
    }

    /// Common continuation after any engine call that can move the turn,
    /// advance the street, or end the hand.
    pub async fn process_engine_event(&self, table_id: TableId, event: EngineEvent) {
        self.publish_snapshot(table_id).await;

        match event {
            EngineEvent::TurnAdvanced => {
                if let (Some(hand), Some(config)) = (
                    self.store.snapshot(table_id).await.and_then(|s| s.hand),
                    self.store.config_of(table_id).await,
                ) {
                    self.start_turn_timer(table_id, hand.hand_id, hand.turn, config.turn_timer_seconds)
                        .await;
                }
            }
            EngineEvent::StreetAdvanced => {
                if let Some(hand) = self.store.snapshot(table_id).await.and_then(|s| s.hand) {
                    let event_type = match hand.community_cards.len() {
                        3 => EventType::FlopDealt,
                        4 => EventType::TurnDealt,
                        5 => EventType::RiverDealt,
                        _ => EventType::ActionTaken,
                    };
                    self.publish_event(event_type, table_id, Some(hand.hand_id), None, None, serde_json::Value::Null)
                        .await;
                    if let Some(config) = self.store.config_of(table_id).await {
                        self.start_turn_timer(table_id, hand.hand_id, hand.turn, config.turn_timer_seconds)
                            .await;
                    }
                }
            }
            EngineEvent::HandEnded { outcome } => {
                self.timers.clear_turn_timer(table_id).await;
                self.handle_hand_ended(table_id, outcome).await;
            }
        }
    }

    async fn handle_hand_ended(&self, table_id: TableId, outcome: HandOutcome) {
        let Some(hand) = self.store.snapshot(table_id).await.and_then(|s| s.hand) else {
            return;
        };
        let state = self.store.snapshot(table_id).await.unwrap();
        // A timeout anywhere during the hand overrides the immediate
        // fold-win/showdown label (§9 open question: keep one outcome, not
        // a separate TURN_TIMEOUT-vs-HAND_ENDED distinction).
        let outcome = if hand.timed_out { HandOutcome::Timeout } else { outcome };

        let winners = hand.winners.clone().unwrap_or_default();
        let winner_user_ids: Vec<_> = winners
            .iter()
            .filter_map(|w| state.seats[w.seat.0 as usize].user_id.clone())
            .collect();

        self.publish_event(
            EventType::HandEnded,
            table_id,
            Some(hand.hand_id),
            None,
            None,
            serde_json::to_value(&HandEndedPayload {
                outcome,
                winners: winners.clone(),
                winner_user_ids,
                rake_amount: hand.rake_amount,
            })
            .unwrap_or(serde_json::Value::Null),
        )
        .await;

        let payouts: Vec<PotPayout> = hand
            .payouts
            .iter()
            .filter_map(|(seat_id, &amount)| {
                state.seats[seat_id.0 as usize]
                    .user_id
                    .clone()
                    .map(|user_id| PotPayout { user_id, amount })
            })
            .collect();

        if !payouts.is_empty() {
            let settle = self
                .ledger
                .settle_pot(SettlePotRequest {
                    table_id,
                    hand_id: hand.hand_id,
                    payouts,
                    rake_amount: hand.rake_amount,
                    idempotency_key: format!("settle:{}:{}", table_id, hand.hand_id),
                })
                .await;
            match settle {
                LedgerOutcome::Unavailable => {
                    self.publish_event(
                        EventType::BalanceUnavailable,
                        table_id,
                        Some(hand.hand_id),
                        None,
                        None,
                        serde_json::json!({ "action": holdem_shared::events::BalanceUnavailableAction::Settlement }),
                    )
                    .await;
                }
                LedgerOutcome::Error(_) => {
                    self.publish_event(
                        EventType::SettlementFailed,
                        table_id,
                        Some(hand.hand_id),
                        None,
                        None,
                        serde_json::Value::Null,
                    )
                    .await;
                }
                LedgerOutcome::Ok(()) => {}
            }
        } else {
            let _ = self
                .ledger
                .cancel_pot(CancelPotRequest {
                    table_id,
                    hand_id: hand.hand_id,
                    idempotency_key: format!("settle:{}:{}:cancel", table_id, hand.hand_id),
                })
                .await;
        }

        self.store
            .with_mut(table_id, |entry| {
                entry.state.hand = None;
                entry.table.status = TableStatus::Waiting;
                entry.state.version += 1;
                entry.state.updated_at_ms = self.now_ms();
            })
            .await;
        self.publish_snapshot(table_id).await;

        self.schedule_next_hand(table_id, self.config.next_hand_delay_ms)
            .await;
    }

    pub(super) async fn start_turn_timer(&self, table_id: TableId, hand_id: HandId, seat_id: SeatId, seconds: u32) {
        let Some(orch) = self.self_ref.upgrade() else {
            return;
        };
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(seconds as u64)).await;
            orch.handle_turn_timeout(table_id, hand_id, seat_id).await;
        });
        self.timers.set_turn_timer(table_id, hand_id, seat_id, handle).await;
    }

    async fn schedule_next_hand(&self, table_id: TableId, delay_ms: u64) {
        let Some(orch) = self.self_ref.upgrade() else {
            return;
        };
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            orch.maybe_start_hand(table_id).await;
        });
        self.timers.set_next_hand_timer(table_id, handle).await;
    }
}
