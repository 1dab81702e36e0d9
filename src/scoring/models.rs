// A match is one sitting of four players. It owns the running scores, the dealer
// seat, the streak ledger and the append-only history of everything that happened.
// Every mutation goes through the resolver or the session, which work on a copy and
// swap it in only when the whole operation succeeded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    errors::ScoringError, history::EventRecord, points::Points, streaks::StreakLedger,
};

pub type PlayerId = u32;

pub const PLAYER_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub icon: String,
    pub score: Points,
    pub is_dealer: bool,
    pub dealer_retention_count: u32,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            icon: icon.into(),
            score: Points::ZERO,
            is_dealer: false,
            dealer_retention_count: 0,
        }
    }
}

/// Share of the previous winning amount added on a repeated win against the same loser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum PullMultiplier {
    #[default]
    Half,
    One,
    OneAndHalf,
}

impl PullMultiplier {
    pub fn halves(self) -> i64 {
        match self {
            PullMultiplier::Half => 1,
            PullMultiplier::One => 2,
            PullMultiplier::OneAndHalf => 3,
        }
    }
}

impl TryFrom<f64> for PullMultiplier {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value == 0.5 {
            Ok(PullMultiplier::Half)
        } else if value == 1.0 {
            Ok(PullMultiplier::One)
        } else if value == 1.5 {
            Ok(PullMultiplier::OneAndHalf)
        } else {
            Err(format!("pull multiplier must be 0.5, 1 or 1.5, got {}", value))
        }
    }
}

impl From<PullMultiplier> for f64 {
    fn from(multiplier: PullMultiplier) -> Self {
        multiplier.halves() as f64 / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusKind {
    Bonus,
    Penalty,
}

/// How many base scores one bonus/penalty unit is worth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum BonusUnits {
    Half,
    #[default]
    One,
    Two,
}

impl BonusUnits {
    pub fn halves(self) -> i64 {
        match self {
            BonusUnits::Half => 1,
            BonusUnits::One => 2,
            BonusUnits::Two => 4,
        }
    }
}

impl TryFrom<f64> for BonusUnits {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value == 0.5 {
            Ok(BonusUnits::Half)
        } else if value == 1.0 {
            Ok(BonusUnits::One)
        } else if value == 2.0 {
            Ok(BonusUnits::Two)
        } else {
            Err(format!("bonus units must be 0.5, 1 or 2, got {}", value))
        }
    }
}

impl From<BonusUnits> for f64 {
    fn from(units: BonusUnits) -> Self {
        units.halves() as f64 / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchConfig {
    pub base_score: u32,
    pub pull_multiplier: PullMultiplier,
    /// Player ids in table order; the dealer seat passes to the next entry.
    pub seating: [PlayerId; PLAYER_COUNT],
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            base_score: 5,
            pull_multiplier: PullMultiplier::Half,
            seating: [1, 2, 3, 4],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub match_id: String,
    pub created_at: DateTime<Utc>,
    pub players: Vec<Player>,
    pub history: Vec<EventRecord>,
    pub rotation_count: u32,
    pub streaks: StreakLedger,
    pub config: MatchConfig,
}

impl Match {
    pub fn new(players: Vec<Player>, config: MatchConfig) -> Self {
        Self {
            match_id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            players,
            history: Vec::new(),
            rotation_count: 0,
            streaks: StreakLedger::default(),
            config,
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn require_player(&self, id: PlayerId) -> Result<&Player, ScoringError> {
        self.player(id)
            .ok_or_else(|| ScoringError::validation(format!("unknown player id {}", id)))
    }

    pub(crate) fn require_player_mut(&mut self, id: PlayerId) -> Result<&mut Player, ScoringError> {
        self.player_mut(id)
            .ok_or_else(|| ScoringError::validation(format!("unknown player id {}", id)))
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn dealer(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_dealer)
    }

    pub fn dealer_id(&self) -> Option<PlayerId> {
        self.dealer().map(|p| p.id)
    }

    /// Serializes the whole match, history included, for export.
    pub fn export_json(&self) -> Result<String, ScoringError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ScoringError::validation(format!("cannot export match: {}", e)))
    }

    /// Reads an exported match back and gives it a fresh match id.
    pub fn import_json(json: &str) -> Result<Self, ScoringError> {
        let imported: Match = serde_json::from_str(json)
            .map_err(|e| ScoringError::validation(format!("cannot import match: {}", e)))?;
        imported.validate()?;
        Ok(imported.reissued())
    }

    pub fn reissued(mut self) -> Self {
        self.match_id = Uuid::new_v4().to_string();
        self
    }

    /// Structural checks for a match that did not come from `MatchSetup`.
    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.players.len() != PLAYER_COUNT {
            return Err(ScoringError::validation(format!(
                "a match needs exactly {} players, got {}",
                PLAYER_COUNT,
                self.players.len()
            )));
        }

        let mut ids = self.player_ids();
        ids.sort_unstable();
        ids.dedup();
        if ids.len() != PLAYER_COUNT {
            return Err(ScoringError::validation("player ids must be unique"));
        }

        validate_seating(&self.config.seating, &ids)?;

        let dealers = self.players.iter().filter(|p| p.is_dealer).count();
        if dealers != 1 {
            return Err(ScoringError::validation(format!(
                "exactly one dealer is required, found {}",
                dealers
            )));
        }

        for (key, entry) in self.streaks.active() {
            if key.winner_id == key.loser_id {
                return Err(ScoringError::validation(format!(
                    "player {} cannot hold a streak over themselves",
                    key.winner_id
                )));
            }
            if !ids.contains(&key.winner_id) || !ids.contains(&key.loser_id) {
                return Err(ScoringError::validation(format!(
                    "streak {} over {} names an unknown player",
                    key.winner_id, key.loser_id
                )));
            }
            if entry.total_amount.is_zero() {
                return Err(ScoringError::validation(format!(
                    "streak {} over {} has a count but no amount",
                    key.winner_id, key.loser_id
                )));
            }
        }

        Ok(())
    }
}

pub(crate) fn validate_seating(
    seating: &[PlayerId; PLAYER_COUNT],
    player_ids: &[PlayerId],
) -> Result<(), ScoringError> {
    let mut seats = seating.to_vec();
    seats.sort_unstable();
    let mut ids = player_ids.to_vec();
    ids.sort_unstable();
    if seats != ids {
        return Err(ScoringError::validation(format!(
            "seating {:?} is not a permutation of the players",
            seating
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{setup::MatchSetup, streaks::StreakKey};
    use rstest::rstest;
    use serde_json::{json, Value};

    #[test]
    fn pull_multiplier_accepts_only_known_values() {
        assert_eq!(PullMultiplier::try_from(0.5), Ok(PullMultiplier::Half));
        assert_eq!(PullMultiplier::try_from(1.0), Ok(PullMultiplier::One));
        assert_eq!(PullMultiplier::try_from(1.5), Ok(PullMultiplier::OneAndHalf));
        assert!(PullMultiplier::try_from(2.0).is_err());
        assert!(PullMultiplier::try_from(0.75).is_err());
    }

    #[test]
    fn bonus_units_reject_other_values() {
        assert_eq!(BonusUnits::try_from(2.0), Ok(BonusUnits::Two));
        assert!(BonusUnits::try_from(0.0).is_err());
        assert!(BonusUnits::try_from(3.0).is_err());
        assert!(serde_json::from_str::<BonusUnits>("1.5").is_err());
    }

    #[test]
    fn import_reissues_match_id() {
        let game = MatchSetup::new().build().unwrap();
        let json = game.export_json().unwrap();

        let imported = Match::import_json(&json).unwrap();

        assert_ne!(imported.match_id, game.match_id);
        let mut expected = game.clone();
        expected.match_id = imported.match_id.clone();
        assert_eq!(imported, expected);
    }

    #[test]
    fn import_rejects_broken_seating() {
        let mut game = MatchSetup::new().build().unwrap();
        game.config.seating = [1, 1, 2, 3];
        let json = serde_json::to_string(&game).unwrap();

        let result = Match::import_json(&json);
        assert!(matches!(result, Err(ScoringError::Validation(_))));
    }

    #[rstest]
    #[case::self_streak(json!({ "winnerId": 2, "loserId": 2, "count": 1, "totalAmount": 9.0, "lastScoreChange": 9.0 }))]
    #[case::unknown_winner(json!({ "winnerId": 7, "loserId": 2, "count": 1, "totalAmount": 9.0, "lastScoreChange": 9.0 }))]
    #[case::unknown_loser(json!({ "winnerId": 1, "loserId": 0, "count": 1, "totalAmount": 9.0, "lastScoreChange": 9.0 }))]
    #[case::count_without_amount(json!({ "winnerId": 1, "loserId": 2, "count": 2, "totalAmount": 0.0, "lastScoreChange": 0.0 }))]
    fn import_rejects_inconsistent_streaks(#[case] record: Value) {
        let game = MatchSetup::new().build().unwrap();
        let mut value = serde_json::to_value(&game).unwrap();
        value["streaks"] = json!([record]);

        let result = Match::import_json(&value.to_string());
        assert!(matches!(result, Err(ScoringError::Validation(_))));
    }

    #[test]
    fn import_accepts_consistent_streaks() {
        let game = MatchSetup::new().build().unwrap();
        let mut value = serde_json::to_value(&game).unwrap();
        value["streaks"] = json!([
            { "winnerId": 1, "loserId": 2, "count": 2, "totalAmount": 24.5, "lastScoreChange": 15.5 }
        ]);

        let imported = Match::import_json(&value.to_string()).unwrap();
        assert_eq!(imported.streaks.get(StreakKey::new(1, 2)).count, 2);
    }
}
