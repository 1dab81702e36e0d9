use rand::seq::SliceRandom;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::{
    errors::ScoringError,
    models::{validate_seating, Match, MatchConfig, Player, PlayerId, PullMultiplier, PLAYER_COUNT},
};

pub const ICON_POOL: [&str; 15] = [
    "🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼", "🐨", "🐯", "🦁", "🐮", "🐷", "🐸", "🐵",
];

/// Builder for a fresh match. Players are numbered 1 to 4.
#[derive(Debug, Clone, Default)]
pub struct MatchSetup {
    names: HashMap<PlayerId, String>,
    icons: HashMap<PlayerId, String>,
    dealer_id: Option<PlayerId>,
    config: MatchConfig,
}

impl MatchSetup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank names fall back to "Player N".
    pub fn with_player_name(mut self, id: PlayerId, name: impl Into<String>) -> Self {
        self.names.insert(id, name.into());
        self
    }

    pub fn with_icon(mut self, id: PlayerId, icon: impl Into<String>) -> Self {
        self.icons.insert(id, icon.into());
        self
    }

    pub fn with_seating(mut self, seating: [PlayerId; PLAYER_COUNT]) -> Self {
        self.config.seating = seating;
        self
    }

    pub fn with_dealer(mut self, id: PlayerId) -> Self {
        self.dealer_id = Some(id);
        self
    }

    pub fn with_base_score(mut self, base_score: u32) -> Self {
        self.config.base_score = base_score;
        self
    }

    pub fn with_pull_multiplier(mut self, pull_multiplier: PullMultiplier) -> Self {
        self.config.pull_multiplier = pull_multiplier;
        self
    }

    pub fn build(self) -> Result<Match, ScoringError> {
        let ids: Vec<PlayerId> = (1..=PLAYER_COUNT as PlayerId).collect();

        if let Some(unknown) = self
            .names
            .keys()
            .chain(self.icons.keys())
            .find(|id| !ids.contains(id))
        {
            return Err(ScoringError::validation(format!(
                "unknown player id {}",
                unknown
            )));
        }
        validate_seating(&self.config.seating, &ids)?;

        let dealer_id = self.dealer_id.unwrap_or(self.config.seating[0]);
        if !ids.contains(&dealer_id) {
            return Err(ScoringError::validation(format!(
                "unknown dealer id {}",
                dealer_id
            )));
        }

        let names: Vec<String> = ids
            .iter()
            .map(|id| match self.names.get(id).map(|n| n.trim()) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => format!("Player {}", id),
            })
            .collect();
        let unique: HashSet<&str> = names.iter().map(String::as_str).collect();
        if unique.len() != names.len() {
            return Err(ScoringError::validation("player names must be unique"));
        }

        let mut pool = ICON_POOL.to_vec();
        pool.shuffle(&mut rand::rng());

        let players = ids
            .iter()
            .zip(names)
            .zip(pool)
            .map(|((id, name), random_icon)| {
                let icon = self
                    .icons
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| random_icon.to_string());

                let mut player = Player::new(*id, name, icon);
                player.is_dealer = *id == dealer_id;
                player
            })
            .collect();

        let game = Match::new(players, self.config);
        debug!(match_id = %game.match_id, dealer_id, "Match set up");
        Ok(game)
    }
}
