use axum::{extract::State, http::StatusCode, Json, response::IntoResponse};
use serde_json::json;

use crate::api::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let writable = state.service_context.announcement_service.is_writable();
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "announcements_writable": writable,
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
