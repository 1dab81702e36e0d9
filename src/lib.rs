// Library crate for the mahjong score keeper.
// The scoring engine is usable on its own; `matches` puts it behind HTTP.

pub mod matches;
pub mod scoring;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use matches::{InMemoryMatchRepository, MatchRepository, MatchService};
pub use scoring::{Match, MatchSession, MatchSetup, Points, ScoringError};
pub use shared::{AppError, AppState};

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// The full application router with tracing and permissive CORS for browser clients.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", axum::routing::get(|| async { "Mahjong score keeper" }))
        .merge(matches::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
