use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    models::{BonusKind, BonusUnits, PlayerId},
    points::Points,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoserDetail {
    pub loser_id: PlayerId,
    pub score: Points,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinnerDetail {
    pub winner_id: PlayerId,
    pub fan: u32,
    pub final_score: Points,
}

/// What happened, without the table context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ScoringEvent {
    BonusPenalty {
        player_id: PlayerId,
        kind: BonusKind,
        units: BonusUnits,
        /// Whole exchange: three times what each other player pays or receives.
        score: Points,
    },
    SelfDrawWin {
        winner_id: PlayerId,
        fan: u32,
        total_score_change: Points,
        loser_details: Vec<LoserDetail>,
    },
    DiscardWin {
        discarder_id: PlayerId,
        winner_details: Vec<WinnerDetail>,
        total_score_change: Points,
    },
    Stalemate,
    Surrender {
        winner_id: PlayerId,
        loser_id: PlayerId,
        count: u32,
        total_amount: Points,
    },
}

/// One immutable history entry.
///
/// `dealer_id` and `rotation_count` describe the table as it was when the
/// event happened, before any seat change the event caused. Records written
/// by one operation share a `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(flatten)]
    pub event: ScoringEvent,
    pub dealer_id: Option<PlayerId>,
    pub rotation_count: u32,
    pub timestamp: DateTime<Utc>,
}

impl EventRecord {
    /// Whether this record closes a hand (a win of any kind or a stalemate).
    pub fn ends_hand(&self) -> bool {
        matches!(
            self.event,
            ScoringEvent::SelfDrawWin { .. }
                | ScoringEvent::DiscardWin { .. }
                | ScoringEvent::Stalemate
        )
    }

    /// Net score change per player caused by this record.
    pub fn score_deltas(&self, player_ids: &[PlayerId]) -> Vec<(PlayerId, Points)> {
        player_ids
            .iter()
            .map(|id| (*id, self.score_delta_for(*id)))
            .collect()
    }

    pub fn score_delta_for(&self, player_id: PlayerId) -> Points {
        match &self.event {
            ScoringEvent::BonusPenalty {
                player_id: actor,
                kind,
                score,
                ..
            } => {
                let signed = match kind {
                    BonusKind::Bonus => *score,
                    BonusKind::Penalty => -*score,
                };
                if *actor == player_id {
                    signed
                } else {
                    -signed.split(3)
                }
            }
            ScoringEvent::SelfDrawWin {
                winner_id,
                total_score_change,
                loser_details,
                ..
            } => {
                if *winner_id == player_id {
                    *total_score_change
                } else {
                    loser_details
                        .iter()
                        .find(|d| d.loser_id == player_id)
                        .map(|d| -d.score)
                        .unwrap_or_default()
                }
            }
            ScoringEvent::DiscardWin {
                discarder_id,
                winner_details,
                total_score_change,
            } => {
                if *discarder_id == player_id {
                    -*total_score_change
                } else {
                    winner_details
                        .iter()
                        .find(|d| d.winner_id == player_id)
                        .map(|d| d.final_score)
                        .unwrap_or_default()
                }
            }
            ScoringEvent::Stalemate | ScoringEvent::Surrender { .. } => Points::ZERO,
        }
    }
}

/// Records that share a timestamp, shown together as one history row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryGroup {
    pub timestamp: DateTime<Utc>,
    pub rotation_count: u32,
    pub dealer_id: Option<PlayerId>,
    pub records: Vec<EventRecord>,
    pub changes: Vec<(PlayerId, Points)>,
}

pub fn group_history(history: &[EventRecord], player_ids: &[PlayerId]) -> Vec<HistoryGroup> {
    let mut groups: Vec<HistoryGroup> = Vec::new();

    for record in history {
        match groups.last_mut() {
            Some(group) if group.timestamp == record.timestamp => {
                group.records.push(record.clone());
            }
            _ => groups.push(HistoryGroup {
                timestamp: record.timestamp,
                rotation_count: record.rotation_count,
                dealer_id: record.dealer_id,
                records: vec![record.clone()],
                changes: Vec::new(),
            }),
        }
    }

    for group in groups.iter_mut() {
        group.changes = player_ids
            .iter()
            .map(|id| {
                let change = group.records.iter().map(|r| r.score_delta_for(*id)).sum();
                (*id, change)
            })
            .collect();
    }

    groups
}
