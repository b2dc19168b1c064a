//! `submitAction` (§4.4) and the turn-timer expiry callback (§4.5), which
//! re-enters the same pipeline with a synthesized CHECK/FOLD.

use holdem_shared::action::{ActionInput, ActionKindTag};
use holdem_shared::errors::GameError;
use holdem_shared::events::{BalanceUnavailableAction, EventType};
use holdem_shared::ids::{HandId, SeatId, TableId, UserId};
use holdem_shared::ledger::{ContributionLabel, LedgerOutcome, RecordContributionRequest};

use super::seat_resolution::resolve_seat_for_user;
use super::Orchestrator;

impl Orchestrator {
    pub async fn submit_action(
        &self,
        table_id: TableId,
        user_id: UserId,
        input: ActionInput,
    ) -> Result<(), GameError> {
        self.submit_action_inner(table_id, user_id, input, false).await
    }

    async fn submit_action_inner(
        &self,
        table_id: TableId,
        user_id: UserId,
        input: ActionInput,
        timed_out: bool,
    ) -> Result<(), GameError> {
        let now = self.now_ms();
        let _guard = self.table_locks.acquire(&table_id).await;

        let config = self
            .store
            .config_of(table_id)
            .await
            .ok_or(GameError::TableNotFound)?;

        let (seat_id, prev_contribution, action_result) = self
            .store
            .with_mut(table_id, |entry| -> Result<_, GameError> {
                if entry.state.hand.is_none() {
                    return Err(GameError::NoHandInProgress);
                }
                let seat_id =
                    resolve_seat_for_user(&entry.state, &user_id).ok_or(GameError::PlayerNotAtTable)?;
                let prev = entry
                    .state
                    .hand
                    .as_ref()
                    .unwrap()
                    .total_contributions
                    .get(&seat_id)
                    .copied()
                    .unwrap_or(0);

                if timed_out {
                    entry.state.hand.as_mut().unwrap().timed_out = true;
                }
                crate::engine::apply_single_action(&mut entry.state, seat_id, input, true, now)?;
                let engine_event = crate::engine::resolve_after_action(&mut entry.state, &config, now)?;
                entry.state.version += 1;
                entry.state.updated_at_ms = now;
                Ok((seat_id, prev, engine_event))
            })
            .await
            .ok_or(GameError::TableLost)??;

        drop(_guard);

        self.publish_snapshot(table_id).await;

        let contribution_delta = self
            .store
            .snapshot(table_id)
            .await
            .and_then(|s| s.hand)
            .map(|h| h.total_contributions.get(&seat_id).copied().unwrap_or(0).saturating_sub(prev_contribution))
            .unwrap_or(0);

        if contribution_delta > 0 {
            if let Some(hand) = self.store.snapshot(table_id).await.and_then(|s| s.hand) {
                let label = match input {
                    ActionInput::Call => ContributionLabel::Call,
                    ActionInput::Bet { .. } => ContributionLabel::Bet,
                    ActionInput::Raise { .. } => ContributionLabel::Raise,
                    ActionInput::AllIn => ContributionLabel::AllIn,
                    _ => ContributionLabel::Call,
                };
                let action_id = hand.actions.last().map(|a| a.action_id).unwrap_or_else(holdem_shared::ids::ActionId::new);
                let outcome = self
                    .ledger
                    .record_contribution(RecordContributionRequest {
                        user_id: user_id.clone(),
                        table_id,
                        hand_id: hand.hand_id,
                        amount: contribution_delta,
                        label,
                        idempotency_key: format!("contrib:{}:{}:{}", table_id, hand.hand_id, action_id),
                    })
                    .await;
                if let LedgerOutcome::Unavailable = outcome {
                    self.publish_event(
                        EventType::BalanceUnavailable,
                        table_id,
                        Some(hand.hand_id),
                        Some(user_id.clone()),
                        Some(seat_id),
                        serde_json::json!({ "action": BalanceUnavailableAction::RecordContribution }),
                    )
                    .await;
                }
            }
        }

        if let Some(hand) = self.store.snapshot(table_id).await.and_then(|s| s.hand) {
            if let Some(last) = hand.actions.last() {
                self.publish_action_taken_event(
                    table_id,
                    hand.hand_id,
                    user_id,
                    seat_id,
                    last.action_id,
                    serde_json::to_value(last).unwrap_or(serde_json::Value::Null),
                )
                .await;
            }
        }

        self.process_engine_event(table_id, action_result).await;
        Ok(())
    }

    /// Turn-timer expiry (§4.5): verify the hand/turn haven't moved since the
    /// timer was scheduled, repair a stale turn if needed, then synthesize a
    /// CHECK (if legal) or FOLD through the normal action pipeline.
    pub async fn handle_turn_timeout(&self, table_id: TableId, hand_id: HandId, seat_id: SeatId) {
        if !self.timers.matches_current(table_id, hand_id, seat_id).await {
            return;
        }

        let Some(state) = self.store.snapshot(table_id).await else {
            return;
        };
        let Some(hand) = &state.hand else { return };
        if hand.hand_id != hand_id || hand.turn != seat_id {
            return;
        }

        let user_id = match &state.seats[seat_id.0 as usize].user_id {
            Some(u) => u.clone(),
            None => return,
        };

        let legal = crate::engine::derive_legal_actions(hand, &state.seats[seat_id.0 as usize]);
        let input = if legal.iter().any(|a| a.kind == ActionKindTag::Check) {
            ActionInput::Check
        } else {
            ActionInput::Fold
        };

        self.publish_event(
            EventType::TurnTimeout,
            table_id,
            Some(hand_id),
            Some(user_id.clone()),
            Some(seat_id),
            serde_json::Value::Null,
        )
        .await;

        if let Err(e) = self.submit_action_inner(table_id, user_id, input, true).await {
            tracing::warn!(error = ?e, table_id = %table_id, "turn timeout auto-action failed, rearming timer");
            if let Some(config) = self.store.config_of(table_id).await {
                self.start_turn_timer(table_id, hand_id, seat_id, config.turn_timer_seconds).await;
            }
        }
    }
}
