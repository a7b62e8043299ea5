use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::types::AppState;

/// GET /health
pub async fn get_health(State(s): State<Arc<AppState>>) -> Response {
    debug!("GET /health");

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "uptime_secs": s.started_at.elapsed().as_secs(),
            "sessions": s.sessions.len(),
            "teachers": s.marketplace.teachers().len(),
            "bookings": s.marketplace.bookings().len(),
            "ai_configured": s.ai.is_configured(),
        })),
    )
        .into_response()
}
