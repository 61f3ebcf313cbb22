use crate::{models::LevelSummary, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct LevelListResponse {
    pub max_level: u32,
    pub levels: Vec<LevelSummary>,
}

/// List every playable level, without word lists
pub async fn list_levels(State(state): State<Arc<AppState>>) -> Json<LevelListResponse> {
    Json(LevelListResponse {
        max_level: state.levels.max_level(),
        levels: state.levels.summaries(),
    })
}

/// Summary of one level
pub async fn get_level(
    State(state): State<Arc<AppState>>,
    Path(level): Path<u32>,
) -> Result<Json<LevelSummary>, StatusCode> {
    state
        .levels
        .level(level)
        .map(|data| Json(data.summary()))
        .ok_or_else(|| {
            tracing::debug!("Unknown level requested: {}", level);
            StatusCode::NOT_FOUND
        })
}
