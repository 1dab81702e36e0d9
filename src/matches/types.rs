use serde::{Deserialize, Serialize};

use crate::scoring::{
    BonusKind, BonusUnits, HistoryGroup, Match, MatchSession, PendingSurrender, PlayerId,
    PlayerSummary, PullMultiplier, ScoreTimeline, StreakRecord, WindPosition, WinningClaim,
    PLAYER_COUNT,
};

/// Request payload for creating a new match. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateMatchRequest {
    pub names: Vec<String>,
    pub icons: Vec<String>,
    pub seating: Option<[PlayerId; PLAYER_COUNT]>,
    pub dealer_id: Option<PlayerId>,
    pub base_score: Option<u32>,
    pub pull_multiplier: Option<PullMultiplier>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusPenaltyRequest {
    pub player_id: PlayerId,
    pub kind: BonusKind,
    #[serde(default)]
    pub units: BonusUnits,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfDrawRequest {
    pub winner_id: PlayerId,
    pub fan: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscardWinRequest {
    pub discarder_id: PlayerId,
    pub winners: Vec<WinningClaim>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealerRequest {
    pub player_id: PlayerId,
}

/// `wind` and `round` are both 0..=3 (East..North).
#[derive(Debug, Serialize, Deserialize)]
pub struct RotationRequest {
    pub wind: u32,
    pub round: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeatingRequest {
    pub seating: [PlayerId; PLAYER_COUNT],
}

/// Answer to the surrender question at the head of the queue.
#[derive(Debug, Serialize, Deserialize)]
pub struct SurrenderAnswerRequest {
    pub accept: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurrenderPairRequest {
    pub winner_id: PlayerId,
    pub loser_id: PlayerId,
}

/// Response for every read or mutation of a single match.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    #[serde(rename = "match")]
    pub state: Match,
    pub pending_surrender: Option<PendingSurrender>,
    pub wind_position: WindPosition,
}

impl From<&MatchSession> for MatchResponse {
    fn from(session: &MatchSession) -> Self {
        Self {
            state: session.state().clone(),
            pending_surrender: session.pending_surrender(),
            wind_position: session.state().wind_position(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StreaksResponse {
    pub streaks: Vec<StreakRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub groups: Vec<HistoryGroup>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub players: Vec<PlayerSummary>,
    pub timeline: ScoreTimeline,
}
