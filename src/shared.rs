use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::matches::{MatchLocks, MatchRepository};
use crate::scoring::ScoringError;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub match_repository: Arc<dyn MatchRepository + Send + Sync>,
    pub match_locks: Arc<MatchLocks>,
}

impl AppState {
    pub fn new(match_repository: Arc<dyn MatchRepository + Send + Sync>) -> Self {
        Self {
            match_repository,
            match_locks: Arc::new(MatchLocks::new()),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<ScoringError> for AppError {
    fn from(error: ScoringError) -> Self {
        match error {
            ScoringError::Validation(msg) => AppError::BadRequest(msg),
            ScoringError::NotFound(msg) => AppError::NotFound(msg),
            other => AppError::Conflict(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// `Json` extractor whose rejections come back as an `AppError` body.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(AppJson(value))
    }
}
