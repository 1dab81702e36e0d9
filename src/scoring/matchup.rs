use serde::{Deserialize, Serialize};

use super::{
    errors::ScoringError,
    models::{MatchConfig, Player, PlayerId},
    points::Points,
    streaks::{StreakKey, StreakLedger},
};

/// What a single line of a matchup breakdown stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
    Fan,
    BaseScore,
    DealerBonus,
    PullBonus,
    HalfCarry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownTerm {
    pub kind: TermKind,
    pub value: Points,
}

/// Transfer from one loser to one winner for one hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchupResult {
    pub winner_id: PlayerId,
    pub loser_id: PlayerId,
    pub fan: u32,
    /// What the loser pays.
    pub total: Points,
    /// The part of `total` that feeds the winner's streak (everything but the half-carry).
    pub streak_contribution: Points,
    pub breakdown: Vec<BreakdownTerm>,
}

impl MatchupResult {
    pub fn half_carry(&self) -> Points {
        self.total - self.streak_contribution
    }
}

/// Computes what `loser` pays `winner` for a hand worth `fan`.
///
/// Rounding to one decimal happens after the pull bonus, after adding it to the
/// base, and after halving the carried streak, exactly in that order.
pub fn compute_matchup(
    winner: &Player,
    loser: &Player,
    fan: u32,
    streaks: &StreakLedger,
    config: &MatchConfig,
) -> Result<MatchupResult, ScoringError> {
    if fan == 0 {
        return Err(ScoringError::validation("fan count must be a positive integer"));
    }
    if winner.id == loser.id {
        return Err(ScoringError::validation(format!(
            "player {} cannot win against themselves",
            winner.id
        )));
    }

    let mut breakdown = vec![
        BreakdownTerm {
            kind: TermKind::Fan,
            value: Points::whole(fan as i64),
        },
        BreakdownTerm {
            kind: TermKind::BaseScore,
            value: Points::whole(config.base_score as i64),
        },
    ];
    let mut base = Points::whole(fan as i64 + config.base_score as i64);

    let dealer = if winner.is_dealer {
        Some(winner)
    } else if loser.is_dealer {
        Some(loser)
    } else {
        None
    };
    if let Some(dealer) = dealer {
        let bonus = Points::whole(2 * dealer.dealer_retention_count as i64 + 1);
        base += bonus;
        breakdown.push(BreakdownTerm {
            kind: TermKind::DealerBonus,
            value: bonus,
        });
    }

    let streak = streaks.get(StreakKey::new(winner.id, loser.id));
    let streak_contribution = if streak.is_active() {
        let pull = streak
            .last_score_change
            .scale_halves(config.pull_multiplier.halves());
        breakdown.push(BreakdownTerm {
            kind: TermKind::PullBonus,
            value: pull,
        });
        base + pull
    } else {
        base
    };

    let reverse = streaks.get(StreakKey::new(loser.id, winner.id));
    let mut total = streak_contribution;
    if reverse.is_active() {
        let carry = reverse.total_amount.scale_halves(1);
        if !carry.is_zero() {
            total += carry;
            breakdown.push(BreakdownTerm {
                kind: TermKind::HalfCarry,
                value: carry,
            });
        }
    }

    Ok(MatchupResult {
        winner_id: winner.id,
        loser_id: loser.id,
        fan,
        total,
        streak_contribution,
        breakdown,
    })
}
