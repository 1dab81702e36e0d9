use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{debug, info, instrument};

use super::{
    repository::MatchRepository,
    types::{
        CreateMatchRequest, HistoryResponse, MatchResponse, StreaksResponse, SummaryResponse,
    },
};
use crate::scoring::{
    Match, MatchSession, MatchSetup, PlayerId, Preview, ScoringError, StreakRecord, WinningClaim,
};
use crate::shared::AppError;

/// One async mutex per match id, so read-modify-write cycles on the same
/// match never interleave.
#[derive(Default)]
pub struct MatchLocks {
    locks: RwLock<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl MatchLocks {
    pub fn new() -> Self {
        Self::default()
    }

    async fn acquire(&self, match_id: &str) -> Arc<AsyncMutex<()>> {
        {
            let guard = self.locks.read().await;
            if let Some(lock) = guard.get(match_id) {
                return lock.clone();
            }
        }

        let mut guard = self.locks.write().await;
        guard
            .entry(match_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    async fn release(&self, match_id: &str) {
        self.locks.write().await.remove(match_id);
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.locks.read().await.len()
    }
}

/// Service for match business logic
pub struct MatchService {
    repository: Arc<dyn MatchRepository + Send + Sync>,
    locks: Arc<MatchLocks>,
}

impl MatchService {
    pub fn new(repository: Arc<dyn MatchRepository + Send + Sync>, locks: Arc<MatchLocks>) -> Self {
        Self { repository, locks }
    }

    #[instrument(skip(self))]
    pub async fn create_match(&self, request: CreateMatchRequest) -> Result<MatchResponse, AppError> {
        let mut setup = MatchSetup::new();
        for (id, name) in (1..).zip(request.names) {
            setup = setup.with_player_name(id, name);
        }
        for (id, icon) in (1..).zip(request.icons) {
            setup = setup.with_icon(id, icon);
        }
        if let Some(seating) = request.seating {
            setup = setup.with_seating(seating);
        }
        if let Some(dealer_id) = request.dealer_id {
            setup = setup.with_dealer(dealer_id);
        }
        if let Some(base_score) = request.base_score {
            setup = setup.with_base_score(base_score);
        }
        if let Some(pull_multiplier) = request.pull_multiplier {
            setup = setup.with_pull_multiplier(pull_multiplier);
        }

        let session = MatchSession::new(setup.build()?);
        self.repository.create_match(&session).await?;

        info!(match_id = %session.match_id(), "Match created");
        Ok(MatchResponse::from(&session))
    }

    /// Stores an exported match under a fresh id with empty undo history.
    #[instrument(skip(self, json))]
    pub async fn import_match(&self, json: &str) -> Result<MatchResponse, AppError> {
        let session = MatchSession::new(Match::import_json(json)?);
        self.repository.create_match(&session).await?;

        info!(
            match_id = %session.match_id(),
            records = session.state().history.len(),
            "Match imported"
        );
        Ok(MatchResponse::from(&session))
    }

    #[instrument(skip(self))]
    pub async fn get_match(&self, match_id: &str) -> Result<MatchResponse, AppError> {
        let session = self.load(match_id).await?;
        Ok(MatchResponse::from(&session))
    }

    #[instrument(skip(self))]
    pub async fn export_match(&self, match_id: &str) -> Result<String, AppError> {
        let session = self.load(match_id).await?;
        Ok(session.state().export_json()?)
    }

    #[instrument(skip(self))]
    pub async fn delete_match(&self, match_id: &str) -> Result<(), AppError> {
        let lock = self.locks.acquire(match_id).await;
        let guard = lock.lock().await;
        let removed = self.repository.delete_match(match_id).await?;
        drop(guard);
        self.locks.release(match_id).await;

        if !removed {
            return Err(AppError::NotFound(format!("match {} not found", match_id)));
        }
        info!(match_id = %match_id, "Match deleted");
        Ok(())
    }

    /// Loads the session, applies `operation` and stores the result while
    /// holding the match lock. Nothing is stored if the operation fails.
    pub async fn update<F>(&self, match_id: &str, operation: F) -> Result<MatchResponse, AppError>
    where
        F: FnOnce(&mut MatchSession) -> Result<(), ScoringError> + Send,
    {
        let lock = self.locks.acquire(match_id).await;
        let guard = lock.lock().await;

        let mut session = match self.load(match_id).await {
            Ok(session) => session,
            Err(error) => {
                // Unknown ids must not leave a lock entry behind.
                drop(guard);
                self.locks.release(match_id).await;
                return Err(error);
            }
        };
        operation(&mut session)?;
        self.repository.update_match(&session).await?;

        debug!(
            match_id = %match_id,
            undo_depth = session.undo_depth(),
            surrender_pending = session.pending_surrender().is_some(),
            "Match stored"
        );
        Ok(MatchResponse::from(&session))
    }

    pub async fn preview_self_draw(
        &self,
        match_id: &str,
        winner_id: PlayerId,
        fan: u32,
    ) -> Result<Preview, AppError> {
        let session = self.load(match_id).await?;
        Ok(session.preview_self_draw(winner_id, fan)?)
    }

    pub async fn preview_discard_win(
        &self,
        match_id: &str,
        discarder_id: PlayerId,
        winners: &[WinningClaim],
    ) -> Result<Preview, AppError> {
        let session = self.load(match_id).await?;
        Ok(session.preview_discard_win(discarder_id, winners)?)
    }

    pub async fn streaks(&self, match_id: &str) -> Result<StreaksResponse, AppError> {
        let session = self.load(match_id).await?;
        let streaks = session
            .active_streaks()
            .into_iter()
            .map(StreakRecord::from)
            .collect();
        Ok(StreaksResponse { streaks })
    }

    pub async fn history(&self, match_id: &str) -> Result<HistoryResponse, AppError> {
        let session = self.load(match_id).await?;
        Ok(HistoryResponse {
            groups: session.history_groups(),
        })
    }

    pub async fn summary(&self, match_id: &str) -> Result<SummaryResponse, AppError> {
        let session = self.load(match_id).await?;
        Ok(SummaryResponse {
            players: session.player_summaries(),
            timeline: session.score_timeline(),
        })
    }

    async fn load(&self, match_id: &str) -> Result<MatchSession, AppError> {
        self.repository
            .get_match(match_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("match {} not found", match_id)))
    }
}
