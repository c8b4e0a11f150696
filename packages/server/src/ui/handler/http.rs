//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::{infrastructure::dto::http::OnlineUsersDto, ui::state::AppState};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get the sorted list of users with a live connection
pub async fn online_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OnlineUsersDto>, StatusCode> {
    match state.hub.online_users().await {
        Ok(user_ids) => Ok(Json(user_ids.into())),
        Err(e) => {
            tracing::error!("Hub unavailable: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
