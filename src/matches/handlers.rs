use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::MatchService,
    types::{
        BonusPenaltyRequest, CreateMatchRequest, DealerRequest, DiscardWinRequest,
        HistoryResponse, MatchResponse, RotationRequest, SeatingRequest, SelfDrawRequest,
        StreaksResponse, SummaryResponse, SurrenderAnswerRequest, SurrenderPairRequest,
    },
};
use crate::scoring::Preview;
use crate::shared::{AppError, AppJson, AppState};

fn service(state: &AppState) -> MatchService {
    MatchService::new(
        Arc::clone(&state.match_repository),
        Arc::clone(&state.match_locks),
    )
}

/// POST /matches
#[instrument(name = "create_match", skip(state))]
pub async fn create_match(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateMatchRequest>,
) -> Result<(StatusCode, Json<MatchResponse>), AppError> {
    let response = service(&state).create_match(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /matches/import
///
/// Takes the body produced by GET /matches/:id/export.
#[instrument(name = "import_match", skip(state, body))]
pub async fn import_match(
    State(state): State<AppState>,
    body: String,
) -> Result<(StatusCode, Json<MatchResponse>), AppError> {
    let response = service(&state).import_match(&body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(name = "get_match", skip(state))]
pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<MatchResponse>, AppError> {
    Ok(Json(service(&state).get_match(&match_id).await?))
}

#[instrument(name = "export_match", skip(state))]
pub async fn export_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let json = service(&state).export_match(&match_id).await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], json))
}

#[instrument(name = "delete_match", skip(state))]
pub async fn delete_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<StatusCode, AppError> {
    service(&state).delete_match(&match_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(name = "bonus_penalty", skip(state))]
pub async fn bonus_penalty(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    AppJson(request): AppJson<BonusPenaltyRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = service(&state)
        .update(&match_id, |session| {
            session
                .apply_bonus_penalty(request.player_id, request.kind, request.units)
                .map(|_| ())
        })
        .await?;
    Ok(Json(response))
}

#[instrument(name = "self_draw", skip(state))]
pub async fn self_draw(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    AppJson(request): AppJson<SelfDrawRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = service(&state)
        .update(&match_id, |session| {
            session
                .apply_self_draw_win(request.winner_id, request.fan)
                .map(|_| ())
        })
        .await?;
    Ok(Json(response))
}

#[instrument(name = "discard_win", skip(state))]
pub async fn discard_win(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    AppJson(request): AppJson<DiscardWinRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = service(&state)
        .update(&match_id, move |session| {
            session
                .apply_discard_win(request.discarder_id, request.winners)
                .map(|_| ())
        })
        .await?;
    Ok(Json(response))
}

#[instrument(name = "stalemate", skip(state))]
pub async fn stalemate(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = service(&state)
        .update(&match_id, |session| session.apply_stalemate().map(|_| ()))
        .await?;
    Ok(Json(response))
}

#[instrument(name = "set_dealer", skip(state))]
pub async fn set_dealer(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    AppJson(request): AppJson<DealerRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = service(&state)
        .update(&match_id, |session| {
            session.set_dealer_manually(request.player_id).map(|_| ())
        })
        .await?;
    Ok(Json(response))
}

#[instrument(name = "set_rotation", skip(state))]
pub async fn set_rotation(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    AppJson(request): AppJson<RotationRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = service(&state)
        .update(&match_id, |session| {
            session.set_rotation(request.wind, request.round).map(|_| ())
        })
        .await?;
    Ok(Json(response))
}

#[instrument(name = "set_seating", skip(state))]
pub async fn set_seating(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    AppJson(request): AppJson<SeatingRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = service(&state)
        .update(&match_id, |session| session.set_seating(request.seating).map(|_| ()))
        .await?;
    Ok(Json(response))
}

#[instrument(name = "answer_surrender", skip(state))]
pub async fn answer_surrender(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    AppJson(request): AppJson<SurrenderAnswerRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = service(&state)
        .update(&match_id, |session| {
            session.resolve_surrender(request.accept).map(|_| ())
        })
        .await?;
    info!(
        match_id = %match_id,
        accepted = request.accept,
        still_pending = response.pending_surrender.is_some(),
        "Surrender answered"
    );
    Ok(Json(response))
}

#[instrument(name = "surrender_pair", skip(state))]
pub async fn surrender_pair(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    AppJson(request): AppJson<SurrenderPairRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = service(&state)
        .update(&match_id, |session| {
            session
                .surrender_pair(request.winner_id, request.loser_id)
                .map(|_| ())
        })
        .await?;
    Ok(Json(response))
}

#[instrument(name = "surrender_all", skip(state))]
pub async fn surrender_all(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = service(&state)
        .update(&match_id, |session| session.surrender_all().map(|_| ()))
        .await?;
    Ok(Json(response))
}

#[instrument(name = "rollback", skip(state))]
pub async fn rollback(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = service(&state)
        .update(&match_id, |session| session.rollback().map(|_| ()))
        .await?;
    Ok(Json(response))
}

#[instrument(name = "preview_self_draw", skip(state))]
pub async fn preview_self_draw(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    AppJson(request): AppJson<SelfDrawRequest>,
) -> Result<Json<Preview>, AppError> {
    let preview = service(&state)
        .preview_self_draw(&match_id, request.winner_id, request.fan)
        .await?;
    Ok(Json(preview))
}

#[instrument(name = "preview_discard_win", skip(state))]
pub async fn preview_discard_win(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    AppJson(request): AppJson<DiscardWinRequest>,
) -> Result<Json<Preview>, AppError> {
    let preview = service(&state)
        .preview_discard_win(&match_id, request.discarder_id, &request.winners)
        .await?;
    Ok(Json(preview))
}

#[instrument(name = "list_streaks", skip(state))]
pub async fn list_streaks(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<StreaksResponse>, AppError> {
    Ok(Json(service(&state).streaks(&match_id).await?))
}

#[instrument(name = "list_history", skip(state))]
pub async fn list_history(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<HistoryResponse>, AppError> {
    Ok(Json(service(&state).history(&match_id).await?))
}

#[instrument(name = "summary", skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<SummaryResponse>, AppError> {
    Ok(Json(service(&state).summary(&match_id).await?))
}
