use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::scoring::MatchSession;
use crate::shared::AppError;

/// Storage for live matches, keyed by match id.
#[async_trait]
pub trait MatchRepository {
    async fn create_match(&self, session: &MatchSession) -> Result<(), AppError>;
    async fn get_match(&self, match_id: &str) -> Result<Option<MatchSession>, AppError>;
    async fn update_match(&self, session: &MatchSession) -> Result<(), AppError>;
    /// Returns `false` when there was nothing to delete.
    async fn delete_match(&self, match_id: &str) -> Result<bool, AppError>;
}

/// In-memory implementation of MatchRepository
pub struct InMemoryMatchRepository {
    matches: RwLock<HashMap<String, MatchSession>>,
}

impl Default for InMemoryMatchRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMatchRepository {
    pub fn new() -> Self {
        Self {
            matches: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    #[instrument(skip(self, session))]
    async fn create_match(&self, session: &MatchSession) -> Result<(), AppError> {
        let match_id = session.match_id().to_string();
        debug!(match_id = %match_id, "Storing new match in memory");

        let mut matches = self.matches.write().await;
        if matches.contains_key(&match_id) {
            warn!(match_id = %match_id, "Match already exists in memory");
            return Err(AppError::Conflict(format!("match {} already exists", match_id)));
        }
        matches.insert(match_id, session.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_match(&self, match_id: &str) -> Result<Option<MatchSession>, AppError> {
        let matches = self.matches.read().await;
        let session = matches.get(match_id).cloned();
        debug!(match_id = %match_id, found = session.is_some(), "Fetched match from memory");
        Ok(session)
    }

    #[instrument(skip(self, session))]
    async fn update_match(&self, session: &MatchSession) -> Result<(), AppError> {
        let mut matches = self.matches.write().await;
        match matches.get_mut(session.match_id()) {
            Some(stored) => {
                *stored = session.clone();
                debug!(match_id = %session.match_id(), "Match updated in memory");
                Ok(())
            }
            None => Err(AppError::NotFound(format!(
                "match {} not found",
                session.match_id()
            ))),
        }
    }

    #[instrument(skip(self))]
    async fn delete_match(&self, match_id: &str) -> Result<bool, AppError> {
        let removed = self.matches.write().await.remove(match_id).is_some();
        debug!(match_id = %match_id, removed, "Deleted match from memory");
        Ok(removed)
    }
}
