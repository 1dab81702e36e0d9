// Public API
pub use errors::ScoringError;
pub use history::{EventRecord, HistoryGroup, LoserDetail, ScoringEvent, WinnerDetail};
pub use matchup::{compute_matchup, BreakdownTerm, MatchupResult, TermKind};
pub use models::{
    BonusKind, BonusUnits, Match, MatchConfig, Player, PlayerId, PullMultiplier, PLAYER_COUNT,
};
pub use points::Points;
pub use resolver::{resolve, EventRequest, Preview, Resolution, WinningClaim};
pub use rotation::{Wind, WindPosition};
pub use session::{MatchSession, SurrenderProgress};
pub use setup::{MatchSetup, ICON_POOL};
pub use stats::{PlayerSummary, ScoreSeries, ScoreTimeline};
pub use streaks::{StreakEntry, StreakKey, StreakLedger, StreakRecord};
pub use surrender::{PendingSurrender, SurrenderState, SURRENDER_INTERVAL};
pub use undo::{UndoLedger, UNDO_CAPACITY};

// Internal modules
mod errors;
mod history;
mod matchup;
mod models;
mod points;
mod resolver;
mod rotation;
mod session;
mod setup;
mod stats;
mod streaks;
mod surrender;
mod undo;
