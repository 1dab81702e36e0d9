use axum::{
    routing::{get, post},
    Router,
};

use crate::shared::AppState;

// Public API
pub use repository::{InMemoryMatchRepository, MatchRepository};
pub use service::{MatchLocks, MatchService};
pub use types::{CreateMatchRequest, MatchResponse};

// Internal modules
mod handlers;
mod repository;
mod service;
mod types;

/// All match endpoints, ready to be merged into the application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/matches", post(handlers::create_match))
        .route("/matches/import", post(handlers::import_match))
        .route(
            "/matches/:id",
            get(handlers::get_match).delete(handlers::delete_match),
        )
        .route("/matches/:id/export", get(handlers::export_match))
        .route("/matches/:id/bonus-penalty", post(handlers::bonus_penalty))
        .route("/matches/:id/self-draw", post(handlers::self_draw))
        .route("/matches/:id/discard-win", post(handlers::discard_win))
        .route("/matches/:id/stalemate", post(handlers::stalemate))
        .route("/matches/:id/dealer", post(handlers::set_dealer))
        .route("/matches/:id/rotation", post(handlers::set_rotation))
        .route("/matches/:id/seating", post(handlers::set_seating))
        .route("/matches/:id/surrender", post(handlers::answer_surrender))
        .route("/matches/:id/rollback", post(handlers::rollback))
        .route(
            "/matches/:id/preview/self-draw",
            post(handlers::preview_self_draw),
        )
        .route(
            "/matches/:id/preview/discard-win",
            post(handlers::preview_discard_win),
        )
        .route("/matches/:id/streaks", get(handlers::list_streaks))
        .route(
            "/matches/:id/streaks/surrender",
            post(handlers::surrender_pair),
        )
        .route(
            "/matches/:id/streaks/surrender-all",
            post(handlers::surrender_all),
        )
        .route("/matches/:id/history", get(handlers::list_history))
        .route("/matches/:id/summary", get(handlers::summary))
}
