use serde::{Deserialize, Serialize};

use super::{
    history::{group_history, HistoryGroup, ScoringEvent},
    models::{Match, PlayerId},
    points::Points,
    streaks::{StreakEntry, StreakKey},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub player_id: PlayerId,
    pub name: String,
    pub icon: String,
    /// Self-draws plus discard wins.
    pub wins: u32,
    pub self_draws: u32,
    pub discards_dealt: u32,
    pub bonus_penalty_net: Points,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSeries {
    pub player_id: PlayerId,
    pub scores: Vec<Points>,
}

/// Cumulative scores sampled after every finished hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreTimeline {
    pub labels: Vec<String>,
    pub series: Vec<ScoreSeries>,
}

impl Match {
    pub fn active_streaks(&self) -> Vec<(StreakKey, StreakEntry)> {
        self.streaks.active()
    }

    pub fn history_groups(&self) -> Vec<HistoryGroup> {
        group_history(&self.history, &self.player_ids())
    }

    pub fn player_summaries(&self) -> Vec<PlayerSummary> {
        let mut summaries: Vec<PlayerSummary> = self
            .players
            .iter()
            .map(|p| PlayerSummary {
                player_id: p.id,
                name: p.name.clone(),
                icon: p.icon.clone(),
                wins: 0,
                self_draws: 0,
                discards_dealt: 0,
                bonus_penalty_net: Points::ZERO,
            })
            .collect();

        for record in &self.history {
            match &record.event {
                ScoringEvent::SelfDrawWin { winner_id, .. } => {
                    if let Some(s) = summaries.iter_mut().find(|s| s.player_id == *winner_id) {
                        s.self_draws += 1;
                        s.wins += 1;
                    }
                }
                ScoringEvent::DiscardWin {
                    discarder_id,
                    winner_details,
                    ..
                } => {
                    for summary in summaries.iter_mut() {
                        if summary.player_id == *discarder_id {
                            summary.discards_dealt += 1;
                        }
                        if winner_details.iter().any(|d| d.winner_id == summary.player_id) {
                            summary.wins += 1;
                        }
                    }
                }
                ScoringEvent::BonusPenalty { .. } => {
                    for summary in summaries.iter_mut() {
                        summary.bonus_penalty_net += record.score_delta_for(summary.player_id);
                    }
                }
                ScoringEvent::Stalemate | ScoringEvent::Surrender { .. } => {}
            }
        }

        summaries
    }

    /// Builds the score chart data. The first point is `Start`, each finished
    /// hand adds `Hand N`, and bonus/penalty entries after the last hand add a
    /// trailing `Current` point. The last point always equals the live scores.
    pub fn score_timeline(&self) -> ScoreTimeline {
        let ids = self.player_ids();
        let mut running = vec![Points::ZERO; ids.len()];
        let mut labels = vec!["Start".to_string()];
        let mut points: Vec<Vec<Points>> = vec![running.clone()];
        let mut hands = 0;
        let mut pending = false;

        for record in &self.history {
            for (total, id) in running.iter_mut().zip(&ids) {
                *total += record.score_delta_for(*id);
            }
            if matches!(record.event, ScoringEvent::BonusPenalty { .. }) {
                pending = true;
            }
            if record.ends_hand() {
                hands += 1;
                labels.push(format!("Hand {}", hands));
                points.push(running.clone());
                pending = false;
            }
        }

        if pending {
            labels.push("Current".to_string());
            points.push(running);
        }

        if let Some(last) = points.last_mut() {
            for (slot, player) in last.iter_mut().zip(&self.players) {
                *slot = player.score;
            }
        }

        let series = ids
            .iter()
            .enumerate()
            .map(|(index, id)| ScoreSeries {
                player_id: *id,
                scores: points.iter().map(|row| row[index]).collect(),
            })
            .collect();

        ScoreTimeline { labels, series }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{
        models::{BonusKind, BonusUnits},
        resolver::{resolve, EventRequest, WinningClaim},
        setup::MatchSetup,
    };
    use chrono::Utc;

    fn play(game: Match, requests: Vec<EventRequest>) -> Match {
        requests.into_iter().fold(game, |state, request| {
            resolve(&state, &request, Utc::now()).unwrap().state
        })
    }

    #[test]
    fn summaries_count_wins_and_discards() {
        let game = play(
            MatchSetup::new().build().unwrap(),
            vec![
                EventRequest::SelfDrawWin { winner_id: 2, fan: 1 },
                EventRequest::DiscardWin {
                    discarder_id: 4,
                    winners: vec![
                        WinningClaim { winner_id: 1, fan: 1 },
                        WinningClaim { winner_id: 2, fan: 1 },
                    ],
                },
                EventRequest::BonusPenalty {
                    player_id: 3,
                    kind: BonusKind::Penalty,
                    units: BonusUnits::One,
                },
                EventRequest::Stalemate,
            ],
        );

        let summaries = game.player_summaries();
        let by_id = |id: PlayerId| summaries.iter().find(|s| s.player_id == id).unwrap();

        assert_eq!((by_id(2).wins, by_id(2).self_draws), (2, 1));
        assert_eq!((by_id(1).wins, by_id(1).self_draws), (1, 0));
        assert_eq!(by_id(4).discards_dealt, 1);
        assert_eq!(by_id(3).bonus_penalty_net, Points::whole(-15));
        assert_eq!(by_id(1).bonus_penalty_net, Points::whole(5));
    }

    #[test]
    fn timeline_adds_current_point_for_trailing_adjustments() {
        let game = play(
            MatchSetup::new().build().unwrap(),
            vec![
                EventRequest::SelfDrawWin { winner_id: 1, fan: 3 },
                EventRequest::Stalemate,
                EventRequest::BonusPenalty {
                    player_id: 2,
                    kind: BonusKind::Bonus,
                    units: BonusUnits::Half,
                },
            ],
        );

        let timeline = game.score_timeline();

        assert_eq!(timeline.labels, vec!["Start", "Hand 1", "Hand 2", "Current"]);
        let first = &timeline.series[0];
        assert_eq!(first.player_id, 1);
        assert_eq!(
            first.scores,
            vec![
                Points::ZERO,
                Points::whole(27),
                Points::whole(27),
                Points::from_tenths(245),
            ]
        );
        for (series, player) in timeline.series.iter().zip(&game.players) {
            assert_eq!(series.scores.last(), Some(&player.score));
        }
    }

    #[test]
    fn fresh_match_timeline_is_a_single_start_point() {
        let game = MatchSetup::new().build().unwrap();
        let timeline = game.score_timeline();
        assert_eq!(timeline.labels, vec!["Start"]);
        assert!(timeline.series.iter().all(|s| s.scores == vec![Points::ZERO]));
    }
}
