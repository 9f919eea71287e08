use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::handlers::AppState;

/// Reports document-store connectivity so operators can tell a transient
/// outage from a code defect. Never fails the process; an unreachable
/// store yields 503 with the probe error.
pub async fn health_check(State(state): State<AppState>) -> Response {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "timestamp": Utc::now().to_rfc3339(),
            })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "database": "disconnected",
                "error": e.to_string(),
                "timestamp": Utc::now().to_rfc3339(),
            })),
        )
            .into_response(),
    }
}
