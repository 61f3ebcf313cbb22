pub mod health;
pub mod levels;
pub mod progress;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/levels", get(levels::list_levels))
        .route("/levels/{level}", get(levels::get_level))
        .route("/progress", get(progress::get_progress))
        .route("/progress/reset", post(progress::reset_progress))
}
