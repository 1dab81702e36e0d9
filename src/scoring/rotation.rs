use serde::{Deserialize, Serialize};
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use super::{
    errors::ScoringError,
    models::{Match, PlayerId, PLAYER_COUNT},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum Wind {
    East = 0,
    South = 1,
    West = 2,
    North = 3,
}

impl Wind {
    pub fn from_index(index: u32) -> Option<Wind> {
        Wind::iter().nth(index as usize)
    }
}

impl fmt::Display for Wind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Wind::East => "東",
                Wind::South => "南",
                Wind::West => "西",
                Wind::North => "北",
            }
        )
    }
}

/// Where the match stands, derived from the rotation counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindPosition {
    /// Completed full cycles of all four prevailing winds.
    pub cycle: u32,
    pub prevailing: Wind,
    pub hand: Wind,
}

impl WindPosition {
    pub fn from_rotation(rotation_count: u32) -> Self {
        Self {
            cycle: rotation_count / 16,
            prevailing: wind_at(rotation_count / 4),
            hand: wind_at(rotation_count),
        }
    }
}

fn wind_at(index: u32) -> Wind {
    Wind::from_index(index % 4).unwrap_or(Wind::East)
}

impl Match {
    pub fn wind_position(&self) -> WindPosition {
        WindPosition::from_rotation(self.rotation_count)
    }

    /// The dealer won: they keep the seat and their retention bonus grows.
    pub(crate) fn on_dealer_win(&mut self) -> Result<(), ScoringError> {
        let dealer = self
            .players
            .iter_mut()
            .find(|p| p.is_dealer)
            .ok_or_else(|| ScoringError::NotFound("dealer".to_string()))?;
        dealer.dealer_retention_count += 1;
        Ok(())
    }

    /// The dealer seat passes to the next player in seating order.
    pub(crate) fn on_dealer_loss(&mut self) -> Result<PlayerId, ScoringError> {
        let current = self
            .dealer_id()
            .ok_or_else(|| ScoringError::NotFound("dealer".to_string()))?;
        let seat = self
            .config
            .seating
            .iter()
            .position(|id| *id == current)
            .ok_or_else(|| {
                ScoringError::NotFound(format!("seat of dealer {}", current))
            })?;
        let next = self.config.seating[(seat + 1) % PLAYER_COUNT];

        for player in self.players.iter_mut() {
            if player.id == current {
                player.is_dealer = false;
                player.dealer_retention_count = 0;
            }
            if player.id == next {
                player.is_dealer = true;
            }
        }
        self.rotation_count += 1;
        Ok(next)
    }

    /// Hands the dealer seat to `player_id` and clears every retention count.
    pub(crate) fn assign_dealer(&mut self, player_id: PlayerId) -> Result<(), ScoringError> {
        self.require_player(player_id)?;
        for player in self.players.iter_mut() {
            player.is_dealer = player.id == player_id;
            player.dealer_retention_count = 0;
        }
        Ok(())
    }

    /// Jumps to the first cycle's `wind`/`round`, discarding any deeper cycles.
    pub(crate) fn assign_rotation(&mut self, wind: u32, round: u32) -> Result<(), ScoringError> {
        if wind >= 4 || round >= 4 {
            return Err(ScoringError::validation(format!(
                "wind and round must be between 0 and 3, got {} and {}",
                wind, round
            )));
        }
        self.rotation_count = wind * 4 + round;
        Ok(())
    }
}
