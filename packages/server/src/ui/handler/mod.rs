//! HTTP and WebSocket endpoint handlers.

mod file;
mod http;
mod websocket;

pub use file::{download_file, file_info, upload_file};
pub use http::{health_check, online_users};
pub use websocket::websocket_handler;

use axum::http::HeaderMap;

/// Header carrying the session token
pub const TOKEN_HEADER: &str = "token";

/// Read the session token from the request headers, if present
fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
