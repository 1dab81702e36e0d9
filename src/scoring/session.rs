use chrono::Utc;
use tracing::{debug, info};

use super::{
    errors::ScoringError,
    history::HistoryGroup,
    models::{validate_seating, BonusKind, BonusUnits, Match, PlayerId, PLAYER_COUNT},
    resolver::{self, EventRequest, Preview, WinningClaim},
    stats::{PlayerSummary, ScoreTimeline},
    streaks::{StreakEntry, StreakKey},
    surrender::{self, PendingSurrender, SurrenderState},
    undo::UndoLedger,
};

/// Outcome of answering a surrender question.
#[derive(Debug, PartialEq)]
pub enum SurrenderProgress<'a> {
    /// Another question is waiting.
    Pending(PendingSurrender),
    /// The queue is empty and the operation is complete.
    Settled(&'a Match),
}

/// A live match with its undo history and any unanswered surrender questions.
///
/// While a surrender question is open, every other mutating call fails with
/// `SurrenderPending`, so the questions raised by one event are always
/// answered before the next event starts.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSession {
    state: Match,
    undo: UndoLedger,
    surrender: SurrenderState,
}

impl MatchSession {
    pub fn new(state: Match) -> Self {
        Self {
            state,
            undo: UndoLedger::default(),
            surrender: SurrenderState::Idle,
        }
    }

    pub fn match_id(&self) -> &str {
        &self.state.match_id
    }

    pub fn state(&self) -> &Match {
        &self.state
    }

    pub fn into_state(self) -> Match {
        self.state
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn pending_surrender(&self) -> Option<PendingSurrender> {
        self.surrender.current(&self.state)
    }

    pub fn apply_bonus_penalty(
        &mut self,
        player_id: PlayerId,
        kind: BonusKind,
        units: BonusUnits,
    ) -> Result<&Match, ScoringError> {
        self.apply_event(EventRequest::BonusPenalty {
            player_id,
            kind,
            units,
        })
    }

    pub fn apply_self_draw_win(
        &mut self,
        winner_id: PlayerId,
        fan: u32,
    ) -> Result<&Match, ScoringError> {
        self.apply_event(EventRequest::SelfDrawWin { winner_id, fan })
    }

    pub fn apply_discard_win(
        &mut self,
        discarder_id: PlayerId,
        winners: Vec<WinningClaim>,
    ) -> Result<&Match, ScoringError> {
        self.apply_event(EventRequest::DiscardWin {
            discarder_id,
            winners,
        })
    }

    pub fn apply_stalemate(&mut self) -> Result<&Match, ScoringError> {
        self.apply_event(EventRequest::Stalemate)
    }

    /// Resolves one event and queues any surrender questions it raised.
    pub fn apply_event(&mut self, request: EventRequest) -> Result<&Match, ScoringError> {
        self.ensure_idle()?;

        let resolution = resolver::resolve(&self.state, &request, Utc::now())?;
        let surrender = SurrenderState::after_event(&resolution.state.streaks, &resolution.touched);

        self.commit(resolution.state);
        self.surrender = surrender;

        info!(
            match_id = %self.state.match_id,
            event = ?request,
            rotation_count = self.state.rotation_count,
            surrender_pending = self.surrender.is_pending(),
            "Event resolved"
        );
        Ok(&self.state)
    }

    pub fn set_dealer_manually(&mut self, player_id: PlayerId) -> Result<&Match, ScoringError> {
        self.ensure_idle()?;
        let mut next = self.state.clone();
        next.assign_dealer(player_id)?;
        self.commit(next);

        info!(match_id = %self.state.match_id, dealer_id = player_id, "Dealer set manually");
        Ok(&self.state)
    }

    pub fn set_rotation(&mut self, wind: u32, round: u32) -> Result<&Match, ScoringError> {
        self.ensure_idle()?;
        let mut next = self.state.clone();
        next.assign_rotation(wind, round)?;
        self.commit(next);

        info!(
            match_id = %self.state.match_id,
            rotation_count = self.state.rotation_count,
            "Rotation set manually"
        );
        Ok(&self.state)
    }

    pub fn set_seating(
        &mut self,
        seating: [PlayerId; PLAYER_COUNT],
    ) -> Result<&Match, ScoringError> {
        self.ensure_idle()?;
        validate_seating(&seating, &self.state.player_ids())?;
        let mut next = self.state.clone();
        next.config.seating = seating;
        self.commit(next);

        info!(match_id = %self.state.match_id, seating = ?seating, "Seating changed");
        Ok(&self.state)
    }

    /// Answers the surrender question at the front of the queue.
    pub fn resolve_surrender(&mut self, accept: bool) -> Result<SurrenderProgress<'_>, ScoringError> {
        let pending = self
            .pending_surrender()
            .ok_or(ScoringError::NoPendingSurrender)?;
        self.surrender.answer(&mut self.state, accept, Utc::now())?;

        debug!(
            match_id = %self.state.match_id,
            winner_id = pending.winner_id,
            loser_id = pending.loser_id,
            accepted = accept,
            "Surrender answered"
        );

        match self.pending_surrender() {
            Some(next) => Ok(SurrenderProgress::Pending(next)),
            None => Ok(SurrenderProgress::Settled(&self.state)),
        }
    }

    /// Surrenders one active streak outside the automatic check.
    pub fn surrender_pair(
        &mut self,
        winner_id: PlayerId,
        loser_id: PlayerId,
    ) -> Result<&Match, ScoringError> {
        self.ensure_idle()?;
        let key = StreakKey::new(winner_id, loser_id);
        if !self.state.streaks.get(key).is_active() {
            return Err(ScoringError::NotFound(format!(
                "no active streak of {} over {}",
                winner_id, loser_id
            )));
        }

        let mut next = self.state.clone();
        surrender::surrender(&mut next, key, Utc::now());
        self.commit(next);

        info!(match_id = %self.state.match_id, winner_id, loser_id, "Streak surrendered");
        Ok(&self.state)
    }

    /// Surrenders every active streak at once.
    pub fn surrender_all(&mut self) -> Result<&Match, ScoringError> {
        self.ensure_idle()?;
        let active = self.state.streaks.active();
        if active.is_empty() {
            return Err(ScoringError::NotFound("no active streaks".to_string()));
        }

        let timestamp = Utc::now();
        let mut next = self.state.clone();
        for (key, _) in &active {
            surrender::surrender(&mut next, *key, timestamp);
        }
        self.commit(next);

        info!(match_id = %self.state.match_id, count = active.len(), "All streaks surrendered");
        Ok(&self.state)
    }

    /// Restores the state from before the last mutating operation.
    pub fn rollback(&mut self) -> Result<&Match, ScoringError> {
        self.ensure_idle()?;
        self.state = self.undo.pop()?;

        info!(
            match_id = %self.state.match_id,
            remaining = self.undo.len(),
            "Rolled back"
        );
        Ok(&self.state)
    }

    pub fn preview_self_draw(&self, winner_id: PlayerId, fan: u32) -> Result<Preview, ScoringError> {
        resolver::preview_self_draw(&self.state, winner_id, fan)
    }

    pub fn preview_discard_win(
        &self,
        discarder_id: PlayerId,
        winners: &[WinningClaim],
    ) -> Result<Preview, ScoringError> {
        resolver::preview_discard_win(&self.state, discarder_id, winners)
    }

    pub fn active_streaks(&self) -> Vec<(StreakKey, StreakEntry)> {
        self.state.active_streaks()
    }

    pub fn history_groups(&self) -> Vec<HistoryGroup> {
        self.state.history_groups()
    }

    pub fn player_summaries(&self) -> Vec<PlayerSummary> {
        self.state.player_summaries()
    }

    pub fn score_timeline(&self) -> ScoreTimeline {
        self.state.score_timeline()
    }

    fn ensure_idle(&self) -> Result<(), ScoringError> {
        if self.surrender.is_pending() {
            return Err(ScoringError::SurrenderPending);
        }
        Ok(())
    }

    fn commit(&mut self, next: Match) {
        let previous = std::mem::replace(&mut self.state, next);
        self.undo.push(previous);
    }
}
