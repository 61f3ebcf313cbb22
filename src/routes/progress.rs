use crate::{auth::PlayerId, models::PlayerProgress, AppState};
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

/// Progress of the calling player
pub async fn get_progress(
    player: PlayerId,
    State(state): State<Arc<AppState>>,
) -> Result<Json<PlayerProgress>, StatusCode> {
    let progress = state.progress.load(player.as_str()).await.map_err(|e| {
        tracing::error!("Failed to load progress for {}: {}", player.as_str(), e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(progress))
}

/// Forget every level the calling player has completed
pub async fn reset_progress(
    player: PlayerId,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, StatusCode> {
    state.progress.reset(player.as_str()).await.map_err(|e| {
        tracing::error!("Failed to reset progress for {}: {}", player.as_str(), e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    tracing::info!("Progress reset for player {}", player.as_str());
    Ok(StatusCode::NO_CONTENT)
}
