use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::{
    errors::ScoringError,
    history::{EventRecord, ScoringEvent},
    models::{Match, PlayerId},
    points::Points,
    streaks::{StreakKey, StreakLedger},
};

/// Every third consecutive win over the same player asks the loser to surrender.
pub const SURRENDER_INTERVAL: u32 = 3;

/// A surrender question waiting for an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSurrender {
    pub winner_id: PlayerId,
    pub loser_id: PlayerId,
    pub count: u32,
    pub total_amount: Points,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SurrenderState {
    #[default]
    Idle,
    /// Questions are answered front to back, one at a time.
    AwaitingConfirmation(VecDeque<StreakKey>),
}

impl SurrenderState {
    /// Queues every touched streak that just reached a multiple of three wins.
    pub fn after_event(ledger: &StreakLedger, touched: &[StreakKey]) -> Self {
        let queue: VecDeque<StreakKey> = touched
            .iter()
            .copied()
            .filter(|key| {
                let count = ledger.get(*key).count;
                count > 0 && count % SURRENDER_INTERVAL == 0
            })
            .collect();

        if queue.is_empty() {
            SurrenderState::Idle
        } else {
            SurrenderState::AwaitingConfirmation(queue)
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SurrenderState::AwaitingConfirmation(_))
    }

    pub fn current(&self, state: &Match) -> Option<PendingSurrender> {
        match self {
            SurrenderState::Idle => None,
            SurrenderState::AwaitingConfirmation(queue) => queue.front().map(|key| {
                let entry = state.streaks.get(*key);
                PendingSurrender {
                    winner_id: key.winner_id,
                    loser_id: key.loser_id,
                    count: entry.count,
                    total_amount: entry.total_amount,
                }
            }),
        }
    }

    /// Answers the question at the front of the queue.
    pub fn answer(
        &mut self,
        state: &mut Match,
        accept: bool,
        timestamp: DateTime<Utc>,
    ) -> Result<(), ScoringError> {
        let SurrenderState::AwaitingConfirmation(queue) = self else {
            return Err(ScoringError::NoPendingSurrender);
        };
        let key = queue.pop_front().ok_or(ScoringError::NoPendingSurrender)?;

        if accept {
            surrender(state, key, timestamp);
        }

        if queue.is_empty() {
            *self = SurrenderState::Idle;
        }
        Ok(())
    }
}

/// Zeroes the streak and records who gave up against whom.
pub(crate) fn surrender(state: &mut Match, key: StreakKey, timestamp: DateTime<Utc>) {
    let entry = state.streaks.zero(key).unwrap_or_default();
    let record = EventRecord {
        event: ScoringEvent::Surrender {
            winner_id: key.winner_id,
            loser_id: key.loser_id,
            count: entry.count,
            total_amount: entry.total_amount,
        },
        dealer_id: state.dealer_id(),
        rotation_count: state.rotation_count,
        timestamp,
    };
    state.history.push(record);
}
