//! Axum router: maps URL paths to handlers.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{cache_status, get_publications, server_status, update_publications, STREAM_PATH};
use super::sse::stream_publications;
use super::state::{AppState, SharedState};

/// Build the full router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/api/publications", get(get_publications))
        .route("/api/publications/update", post(update_publications))
        .route("/api/publications/status", get(cache_status))
        .route(STREAM_PATH, get(stream_publications))
        .route("/api/status", get(server_status))
        // Middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
