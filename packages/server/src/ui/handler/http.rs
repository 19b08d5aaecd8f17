//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use tidings_shared::time::millis_to_rfc3339;

use crate::{hub::HubStats, ui::state::AppState};

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "predictor": state.route_message_usecase.predictor_name(),
        "started_at": millis_to_rfc3339(state.started_at),
    }))
}

/// Hub counters, as seen by the hub task
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<HubStats>, StatusCode> {
    match state.hub.stats().await {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => {
            tracing::error!("Failed to read hub stats: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
