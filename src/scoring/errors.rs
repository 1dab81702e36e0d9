use thiserror::Error;

/// Errors raised by the scoring engine. None of them leave a match half-updated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Nothing to roll back")]
    EmptyHistory,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("A surrender decision is still pending")]
    SurrenderPending,

    #[error("No surrender decision is pending")]
    NoPendingSurrender,
}

impl ScoringError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        ScoringError::Validation(msg.into())
    }
}
