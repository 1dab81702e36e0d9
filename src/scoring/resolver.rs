// The resolver turns one validated request into the next match state.
// It never touches the state it is given: everything is computed against the
// current match, then applied to a copy, so a failing request changes nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{
    errors::ScoringError,
    history::{EventRecord, LoserDetail, ScoringEvent, WinnerDetail},
    matchup::{compute_matchup, MatchupResult},
    models::{BonusKind, BonusUnits, Match, PlayerId},
    points::Points,
    streaks::StreakKey,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinningClaim {
    pub winner_id: PlayerId,
    pub fan: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum EventRequest {
    BonusPenalty {
        player_id: PlayerId,
        kind: BonusKind,
        units: BonusUnits,
    },
    SelfDrawWin {
        winner_id: PlayerId,
        fan: u32,
    },
    DiscardWin {
        discarder_id: PlayerId,
        winners: Vec<WinningClaim>,
    },
    Stalemate,
}

/// The next match state plus the streaks that grew while producing it.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub state: Match,
    pub touched: Vec<StreakKey>,
}

/// Matchups a win would produce, for showing before it is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub matchups: Vec<MatchupResult>,
    pub total: Points,
}

pub fn resolve(
    current: &Match,
    request: &EventRequest,
    timestamp: DateTime<Utc>,
) -> Result<Resolution, ScoringError> {
    match request {
        EventRequest::BonusPenalty {
            player_id,
            kind,
            units,
        } => resolve_bonus_penalty(current, *player_id, *kind, *units, timestamp),
        EventRequest::SelfDrawWin { winner_id, fan } => {
            resolve_self_draw(current, *winner_id, *fan, timestamp)
        }
        EventRequest::DiscardWin {
            discarder_id,
            winners,
        } => resolve_discard_win(current, *discarder_id, winners, timestamp),
        EventRequest::Stalemate => resolve_stalemate(current, timestamp),
    }
}

pub fn preview_self_draw(
    current: &Match,
    winner_id: PlayerId,
    fan: u32,
) -> Result<Preview, ScoringError> {
    let matchups = self_draw_matchups(current, winner_id, fan)?;
    let total = matchups.iter().map(|m| m.total).sum();
    Ok(Preview { matchups, total })
}

pub fn preview_discard_win(
    current: &Match,
    discarder_id: PlayerId,
    winners: &[WinningClaim],
) -> Result<Preview, ScoringError> {
    let matchups = discard_matchups(current, discarder_id, winners)?;
    let total = matchups.iter().map(|m| m.total).sum();
    Ok(Preview { matchups, total })
}

fn record(current: &Match, event: ScoringEvent, timestamp: DateTime<Utc>) -> EventRecord {
    EventRecord {
        event,
        dealer_id: current.dealer_id(),
        rotation_count: current.rotation_count,
        timestamp,
    }
}

fn resolve_bonus_penalty(
    current: &Match,
    actor_id: PlayerId,
    kind: BonusKind,
    units: BonusUnits,
    timestamp: DateTime<Utc>,
) -> Result<Resolution, ScoringError> {
    current.require_player(actor_id)?;

    let unit = Points::whole(current.config.base_score as i64).scale_halves(units.halves());
    let exchange = unit + unit + unit;
    let (actor_change, other_change) = match kind {
        BonusKind::Bonus => (exchange, -unit),
        BonusKind::Penalty => (-exchange, unit),
    };

    let mut next = current.clone();
    for player in next.players.iter_mut() {
        if player.id == actor_id {
            player.score += actor_change;
        } else {
            player.score += other_change;
        }
    }
    next.history.push(record(
        current,
        ScoringEvent::BonusPenalty {
            player_id: actor_id,
            kind,
            units,
            score: exchange,
        },
        timestamp,
    ));

    Ok(Resolution {
        state: next,
        touched: Vec::new(),
    })
}

fn self_draw_matchups(
    current: &Match,
    winner_id: PlayerId,
    fan: u32,
) -> Result<Vec<MatchupResult>, ScoringError> {
    let winner = current.require_player(winner_id)?;
    current
        .players
        .iter()
        .filter(|p| p.id != winner_id)
        .map(|loser| compute_matchup(winner, loser, fan, &current.streaks, &current.config))
        .collect()
}

fn resolve_self_draw(
    current: &Match,
    winner_id: PlayerId,
    fan: u32,
    timestamp: DateTime<Utc>,
) -> Result<Resolution, ScoringError> {
    let matchups = self_draw_matchups(current, winner_id, fan)?;
    let total_won: Points = matchups.iter().map(|m| m.total).sum();
    let winner_is_dealer = current.require_player(winner_id)?.is_dealer;

    let mut next = current.clone();
    let mut touched = Vec::with_capacity(matchups.len());
    for matchup in &matchups {
        next.require_player_mut(matchup.loser_id)?.score -= matchup.total;
        touched.push(next.streaks.record_win(
            winner_id,
            matchup.loser_id,
            matchup.streak_contribution,
        ));
    }
    next.require_player_mut(winner_id)?.score += total_won;
    next.streaks.break_all_except(&[winner_id]);

    if winner_is_dealer {
        next.on_dealer_win()?;
    } else {
        next.on_dealer_loss()?;
    }

    next.history.push(record(
        current,
        ScoringEvent::SelfDrawWin {
            winner_id,
            fan,
            total_score_change: total_won,
            loser_details: matchups
                .iter()
                .map(|m| LoserDetail {
                    loser_id: m.loser_id,
                    score: m.total,
                })
                .collect(),
        },
        timestamp,
    ));

    Ok(Resolution {
        state: next,
        touched,
    })
}

fn discard_matchups(
    current: &Match,
    discarder_id: PlayerId,
    winners: &[WinningClaim],
) -> Result<Vec<MatchupResult>, ScoringError> {
    let discarder = current.require_player(discarder_id)?;
    if winners.is_empty() {
        return Err(ScoringError::validation(
            "a discard win needs at least one winner",
        ));
    }

    let mut seen = HashSet::new();
    let mut matchups = Vec::with_capacity(winners.len());
    for claim in winners {
        if claim.winner_id == discarder_id {
            return Err(ScoringError::validation(format!(
                "discarder {} cannot also be a winner",
                discarder_id
            )));
        }
        if !seen.insert(claim.winner_id) {
            return Err(ScoringError::validation(format!(
                "winner {} listed more than once",
                claim.winner_id
            )));
        }
        let winner = current.require_player(claim.winner_id)?;
        matchups.push(compute_matchup(
            winner,
            discarder,
            claim.fan,
            &current.streaks,
            &current.config,
        )?);
    }
    Ok(matchups)
}

fn resolve_discard_win(
    current: &Match,
    discarder_id: PlayerId,
    winners: &[WinningClaim],
    timestamp: DateTime<Utc>,
) -> Result<Resolution, ScoringError> {
    let matchups = discard_matchups(current, discarder_id, winners)?;
    let total_lost: Points = matchups.iter().map(|m| m.total).sum();
    let winner_ids: Vec<PlayerId> = matchups.iter().map(|m| m.winner_id).collect();
    let dealer_won = current
        .dealer_id()
        .is_some_and(|dealer| winner_ids.contains(&dealer));

    let mut next = current.clone();
    let mut touched = Vec::with_capacity(matchups.len());
    for matchup in &matchups {
        next.require_player_mut(matchup.winner_id)?.score += matchup.total;
        touched.push(next.streaks.record_win(
            matchup.winner_id,
            discarder_id,
            matchup.streak_contribution,
        ));
    }
    next.require_player_mut(discarder_id)?.score -= total_lost;
    next.streaks.break_all_except(&winner_ids);

    if dealer_won {
        next.on_dealer_win()?;
    } else {
        next.on_dealer_loss()?;
    }

    next.history.push(record(
        current,
        ScoringEvent::DiscardWin {
            discarder_id,
            winner_details: matchups
                .iter()
                .map(|m| WinnerDetail {
                    winner_id: m.winner_id,
                    fan: m.fan,
                    final_score: m.total,
                })
                .collect(),
            total_score_change: total_lost,
        },
        timestamp,
    ));

    Ok(Resolution {
        state: next,
        touched,
    })
}

fn resolve_stalemate(current: &Match, timestamp: DateTime<Utc>) -> Result<Resolution, ScoringError> {
    let mut next = current.clone();
    next.on_dealer_loss()?;
    next.history
        .push(record(current, ScoringEvent::Stalemate, timestamp));

    Ok(Resolution {
        state: next,
        touched: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{models::PullMultiplier, setup::MatchSetup};

    fn fresh_match() -> Match {
        MatchSetup::new()
            .with_base_score(5)
            .with_pull_multiplier(PullMultiplier::Half)
            .with_dealer(1)
            .build()
            .unwrap()
    }

    fn apply(current: &Match, request: EventRequest) -> Resolution {
        resolve(current, &request, Utc::now()).unwrap()
    }

    fn score_sum(game: &Match) -> Points {
        game.players.iter().map(|p| p.score).sum()
    }

    fn score(game: &Match, id: PlayerId) -> Points {
        game.player(id).unwrap().score
    }

    #[test]
    fn dealer_self_draw_charges_every_opponent() {
        let game = fresh_match();

        let resolution = apply(&game, EventRequest::SelfDrawWin { winner_id: 1, fan: 3 });
        let next = resolution.state;

        assert_eq!(score(&next, 1), Points::whole(27));
        for id in [2, 3, 4] {
            assert_eq!(score(&next, id), Points::whole(-9));
        }
        assert_eq!(score_sum(&next), Points::ZERO);
        assert_eq!(next.dealer().unwrap().dealer_retention_count, 1);
        assert_eq!(next.rotation_count, 0);
        assert_eq!(resolution.touched.len(), 3);
        assert_eq!(game.history.len(), 0, "input state must stay untouched");
    }

    #[test]
    fn repeated_self_draw_pulls_from_each_opponent() {
        let game = fresh_match();
        let first = apply(&game, EventRequest::SelfDrawWin { winner_id: 1, fan: 3 }).state;
        let second = apply(&first, EventRequest::SelfDrawWin { winner_id: 1, fan: 3 }).state;

        // 3 + 5 + 3 (dealer kept once) = 11, plus 4.5 pull on the previous 9.
        assert_eq!(score(&second, 2), Points::from_tenths(-90 - 155));
        assert_eq!(score(&second, 1), Points::from_tenths(270 + 3 * 155));
        let streak = second.streaks.get(StreakKey::new(1, 2));
        assert_eq!(streak.count, 2);
        assert_eq!(streak.total_amount, Points::from_tenths(245));
    }

    #[test]
    fn non_dealer_self_draw_rotates_dealer() {
        let game = fresh_match();
        let next = apply(&game, EventRequest::SelfDrawWin { winner_id: 3, fan: 2 }).state;

        assert_eq!(next.dealer_id(), Some(2));
        assert_eq!(next.rotation_count, 1);
        // The record keeps the table as it was before the rotation.
        let entry = next.history.last().unwrap();
        assert_eq!(entry.dealer_id, Some(1));
        assert_eq!(entry.rotation_count, 0);
        // The dealer pays 2 + 5 + 1, the others 2 + 5.
        assert_eq!(score(&next, 1), Points::whole(-8));
        assert_eq!(score(&next, 2), Points::whole(-7));
        assert_eq!(score(&next, 3), Points::whole(22));
    }

    #[test]
    fn discard_win_with_two_winners() {
        let mut game = fresh_match();
        game.streaks.record_win(2, 3, Points::whole(6));
        game.streaks.record_win(2, 4, Points::whole(6));
        game.streaks.record_win(4, 1, Points::whole(6));
        game.streaks.record_win(1, 3, Points::whole(6));

        let resolution = apply(
            &game,
            EventRequest::DiscardWin {
                discarder_id: 2,
                winners: vec![
                    WinningClaim { winner_id: 3, fan: 2 },
                    WinningClaim { winner_id: 4, fan: 1 },
                ],
            },
        );
        let next = resolution.state;

        assert_eq!(score_sum(&next), Points::ZERO);
        // Each winner collects half of the discarder's run against them.
        assert_eq!(score(&next, 3), Points::whole(7 + 3));
        assert_eq!(score(&next, 4), Points::whole(6 + 3));
        assert_eq!(score(&next, 2), Points::whole(-19));

        assert!(!next.streaks.get(StreakKey::new(2, 3)).is_active());
        assert!(!next.streaks.get(StreakKey::new(2, 4)).is_active());
        assert_eq!(next.streaks.get(StreakKey::new(3, 2)).count, 1);
        assert_eq!(next.streaks.get(StreakKey::new(4, 2)).count, 1);
        // 4 won this event, so its run over 1 survives; 1 did not win.
        assert!(next.streaks.get(StreakKey::new(4, 1)).is_active());
        assert!(!next.streaks.get(StreakKey::new(1, 3)).is_active());
        assert_eq!(
            resolution.touched,
            vec![StreakKey::new(3, 2), StreakKey::new(4, 2)]
        );
        assert_eq!(next.dealer_id(), Some(2));
    }

    #[test]
    fn discard_win_keeps_dealer_when_dealer_among_winners() {
        let game = fresh_match();
        let next = apply(
            &game,
            EventRequest::DiscardWin {
                discarder_id: 3,
                winners: vec![
                    WinningClaim { winner_id: 2, fan: 1 },
                    WinningClaim { winner_id: 1, fan: 1 },
                ],
            },
        )
        .state;

        assert_eq!(next.dealer_id(), Some(1));
        assert_eq!(next.dealer().unwrap().dealer_retention_count, 1);
        assert_eq!(next.rotation_count, 0);
    }

    #[test]
    fn discarding_dealer_loses_the_seat() {
        let game = fresh_match();
        let next = apply(
            &game,
            EventRequest::DiscardWin {
                discarder_id: 1,
                winners: vec![WinningClaim { winner_id: 4, fan: 5 }],
            },
        )
        .state;

        assert_eq!(score(&next, 4), Points::whole(11));
        assert_eq!(next.dealer_id(), Some(2));
        assert_eq!(next.rotation_count, 1);
    }

    #[test]
    fn bonus_and_penalty_move_three_units() {
        let game = fresh_match();
        let bonus = apply(
            &game,
            EventRequest::BonusPenalty {
                player_id: 2,
                kind: BonusKind::Bonus,
                units: BonusUnits::Half,
            },
        )
        .state;
        assert_eq!(score(&bonus, 2), Points::from_tenths(75));
        assert_eq!(score(&bonus, 1), Points::from_tenths(-25));

        let penalty = apply(
            &bonus,
            EventRequest::BonusPenalty {
                player_id: 3,
                kind: BonusKind::Penalty,
                units: BonusUnits::Two,
            },
        )
        .state;
        assert_eq!(score(&penalty, 3), Points::from_tenths(-25 - 300));
        assert_eq!(score_sum(&penalty), Points::ZERO);
        assert_eq!(penalty.streaks, game.streaks);
        assert_eq!(penalty.dealer_id(), game.dealer_id());
    }

    #[test]
    fn stalemate_rotates_and_keeps_streaks() {
        let mut game = fresh_match();
        game.players[0].dealer_retention_count = 3;
        game.streaks.record_win(2, 3, Points::whole(6));

        let next = apply(&game, EventRequest::Stalemate).state;

        assert_eq!(next.dealer_id(), Some(2));
        assert_eq!(next.player(1).unwrap().dealer_retention_count, 0);
        assert_eq!(next.rotation_count, 1);
        assert_eq!(next.streaks, game.streaks);
        assert!(next.players.iter().all(|p| p.score.is_zero()));
    }

    #[test]
    fn invalid_requests_are_rejected() {
        let game = fresh_match();
        let now = Utc::now();
        let invalid = [
            EventRequest::SelfDrawWin { winner_id: 9, fan: 3 },
            EventRequest::SelfDrawWin { winner_id: 1, fan: 0 },
            EventRequest::DiscardWin {
                discarder_id: 2,
                winners: vec![],
            },
            EventRequest::DiscardWin {
                discarder_id: 2,
                winners: vec![WinningClaim { winner_id: 2, fan: 1 }],
            },
            EventRequest::DiscardWin {
                discarder_id: 2,
                winners: vec![
                    WinningClaim { winner_id: 3, fan: 1 },
                    WinningClaim { winner_id: 3, fan: 2 },
                ],
            },
            EventRequest::DiscardWin {
                discarder_id: 2,
                winners: vec![
                    WinningClaim { winner_id: 3, fan: 1 },
                    WinningClaim { winner_id: 4, fan: 0 },
                ],
            },
            EventRequest::BonusPenalty {
                player_id: 0,
                kind: BonusKind::Bonus,
                units: BonusUnits::One,
            },
        ];

        for request in invalid {
            let result = resolve(&game, &request, now);
            assert!(
                matches!(result, Err(ScoringError::Validation(_))),
                "{:?} should be rejected",
                request
            );
        }
    }

    #[test]
    fn preview_matches_committed_totals() {
        let game = fresh_match();
        let preview = preview_self_draw(&game, 1, 3).unwrap();
        assert_eq!(preview.total, Points::whole(27));
        assert_eq!(preview.matchups.len(), 3);

        let discard = preview_discard_win(
            &game,
            1,
            &[WinningClaim { winner_id: 2, fan: 2 }, WinningClaim { winner_id: 3, fan: 1 }],
        )
        .unwrap();
        assert_eq!(discard.total, Points::whole(8 + 7));
    }
}
