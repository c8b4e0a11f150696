//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State, ws::WebSocketUpgrade},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    infrastructure::hub::ConnectionHandle,
    ui::{connection::ConnectionActor, state::AppState},
    usecase::AuthError,
};

use super::token_from_headers;

/// Query parameters for WebSocket connection
///
/// Browsers cannot set headers on a WebSocket handshake, so the token may
/// also be passed as `?token=...`.
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let token = token_from_headers(&headers)
        .or(query.token)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let user_id = match state.authenticate_usecase.execute(&token).await {
        Ok(user_id) => user_id,
        Err(AuthError::Unauthorized) => {
            tracing::warn!("Rejecting WebSocket handshake with unknown token");
            return Err(StatusCode::UNAUTHORIZED);
        }
        Err(e) => {
            tracing::error!("Session lookup failed: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    // Early rejection only. The registration after the upgrade is authoritative.
    match state.hub.is_online(&user_id).await {
        Ok(false) => {}
        Ok(true) => {
            tracing::warn!(
                "'{}' is already connected. Rejecting connection.",
                user_id
            );
            return Err(StatusCode::CONFLICT);
        }
        Err(e) => {
            tracing::error!("Hub unavailable: {}", e);
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
    }

    let (handle, outbound) = ConnectionHandle::new(user_id, state.settings.outbound_buffer);
    let actor = ConnectionActor::new(
        handle,
        state.hub.clone(),
        state.send_message_usecase.clone(),
        state.settings.reply_timeout,
    );

    Ok(ws.on_upgrade(move |socket| actor.run(socket, outbound)))
}
