//! # Health Route

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::warn;

use crate::AppState;

/// `GET /health`: 200 while the record store answers, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    if state.service.health_check().await {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        warn!(engine = state.service.engine(), "Health check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable" })),
        )
    }
}
