use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{models::PlayerId, points::Points};

/// Ordered pair: `(winner, loser)` and `(loser, winner)` are different streaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakKey {
    pub winner_id: PlayerId,
    pub loser_id: PlayerId,
}

impl StreakKey {
    pub fn new(winner_id: PlayerId, loser_id: PlayerId) -> Self {
        Self {
            winner_id,
            loser_id,
        }
    }

    pub fn reversed(self) -> Self {
        Self::new(self.loser_id, self.winner_id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakEntry {
    pub count: u32,
    pub total_amount: Points,
    pub last_score_change: Points,
}

impl StreakEntry {
    pub fn is_active(&self) -> bool {
        self.count > 0
    }
}

/// Consecutive wins of one player over another.
///
/// A zeroed streak is removed from the map, so `count == 0` and
/// `total_amount == 0` always hold together for any pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<StreakRecord>", into = "Vec<StreakRecord>")]
pub struct StreakLedger {
    entries: HashMap<StreakKey, StreakEntry>,
}

impl StreakLedger {
    pub fn get(&self, key: StreakKey) -> StreakEntry {
        self.entries.get(&key).copied().unwrap_or_default()
    }

    /// Extends `winner`'s run over `loser` and ends the loser's run over the winner.
    pub fn record_win(
        &mut self,
        winner_id: PlayerId,
        loser_id: PlayerId,
        streak_contribution: Points,
    ) -> StreakKey {
        let key = StreakKey::new(winner_id, loser_id);
        let entry = self.entries.entry(key).or_default();
        entry.count += 1;
        entry.total_amount += streak_contribution;
        entry.last_score_change = streak_contribution;

        self.entries.remove(&key.reversed());
        key
    }

    /// Anyone who did not win the event loses every run they were building.
    pub fn break_all_except(&mut self, winner_ids: &[PlayerId]) {
        self.entries
            .retain(|key, _| winner_ids.contains(&key.winner_id));
    }

    pub fn zero(&mut self, key: StreakKey) -> Option<StreakEntry> {
        self.entries.remove(&key)
    }

    /// Active streaks ordered by winner then loser.
    pub fn active(&self) -> Vec<(StreakKey, StreakEntry)> {
        let mut active: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_active())
            .map(|(key, entry)| (*key, *entry))
            .collect();
        active.sort_by_key(|(key, _)| *key);
        active
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Flat wire form of one ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakRecord {
    pub winner_id: PlayerId,
    pub loser_id: PlayerId,
    pub count: u32,
    pub total_amount: Points,
    pub last_score_change: Points,
}

impl From<(StreakKey, StreakEntry)> for StreakRecord {
    fn from((key, entry): (StreakKey, StreakEntry)) -> Self {
        Self {
            winner_id: key.winner_id,
            loser_id: key.loser_id,
            count: entry.count,
            total_amount: entry.total_amount,
            last_score_change: entry.last_score_change,
        }
    }
}

impl From<StreakLedger> for Vec<StreakRecord> {
    fn from(ledger: StreakLedger) -> Self {
        ledger.active().into_iter().map(StreakRecord::from).collect()
    }
}

impl From<Vec<StreakRecord>> for StreakLedger {
    fn from(records: Vec<StreakRecord>) -> Self {
        let entries = records
            .into_iter()
            .filter(|record| record.count > 0)
            .map(|record| {
                (
                    StreakKey::new(record.winner_id, record.loser_id),
                    StreakEntry {
                        count: record.count,
                        total_amount: record.total_amount,
                        last_score_change: record.last_score_change,
                    },
                )
            })
            .collect();
        Self { entries }
    }
}
