//! JSON endpoints.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use super::state::SharedState;
use crate::utils::{CacheResult, CacheStatus, ProgressReporter};

pub const STREAM_PATH: &str = "/api/publications/stream";

/// `GET /api/publications` - serve the cache while fresh, else point at the stream.
pub async fn get_publications(State(state): State<SharedState>) -> Response {
    match state.service.cached() {
        CacheResult::Hit(entry) => Json(json!({
            "data": entry.data,
            "fromCache": true,
            "isFresh": true,
            "lastUpdated": entry.last_updated,
        }))
        .into_response(),
        _ => (
            StatusCode::TEMPORARY_REDIRECT,
            [(header::LOCATION, STREAM_PATH)],
            format!("Please use {} for initial data fetch", STREAM_PATH),
        )
            .into_response(),
    }
}

/// `POST /api/publications/update` - aggregate now and return the new data.
pub async fn update_publications(State(state): State<SharedState>) -> Response {
    tracing::info!("Force updating publications");

    match state.service.refresh(&mut ProgressReporter::quiet()).await {
        Ok(entry) => Json(json!({
            "success": true,
            "message": "Data updated successfully",
            "lastUpdated": entry.last_updated,
            "data": entry.data,
        }))
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "message": e.to_string(),
            })),
        )
            .into_response(),
    }
}

/// `GET /api/publications/status`
pub async fn cache_status(State(state): State<SharedState>) -> Json<CacheStatus> {
    Json(state.service.status())
}

/// `GET /api/status` - liveness probe.
pub async fn server_status(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ready",
        "cache_exists": state.service.cache_exists(),
    }))
}
