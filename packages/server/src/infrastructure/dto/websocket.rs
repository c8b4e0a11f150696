//! WebSocket packet protocol.
//!
//! Every frame is a JSON envelope `{"kind": ..., "payload": ...}`. Inbound
//! packets are parsed in two stages: the envelope first, then the payload for
//! the announced kind. Each stage has its own error so that a malformed
//! payload, an unknown kind and garbage input can be told apart.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire names of the packet kinds
pub mod kind {
    pub const ONLINE_USERS_QUERY: &str = "online_users_query";
    pub const CHAT_MESSAGE: &str = "chat_message";
    pub const OFFLINE_NOTICE: &str = "offline_notice";
    pub const ONLINE_USERS: &str = "online_users";
    pub const ERROR: &str = "error";
}

/// Reasons carried by `error` packets
pub mod reason {
    pub const CHANNEL_NOT_FOUND: &str = "channel_not_found";
    pub const PERSISTENCE_FAILED: &str = "persistence_failed";
    pub const DUPLICATE_SESSION: &str = "duplicate_session";
    pub const INTERNAL: &str = "internal";
}

/// Errors raised while parsing an inbound frame
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("Invalid packet envelope: {0}")]
    InvalidEnvelope(String),

    #[error("Malformed payload for '{kind}': {reason}")]
    MalformedPayload { kind: String, reason: String },

    #[error("Unknown packet kind '{0}'")]
    UnknownKind(String),
}

impl PacketError {
    fn malformed(kind: &str, reason: impl ToString) -> Self {
        Self::MalformedPayload {
            kind: kind.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPacket {
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
}

/// Payload of an inbound `chat_message`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageRequest {
    pub channel_id: String,
    pub content: String,
}

/// Packets a client may send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientPacket {
    OnlineUsersQuery,
    ChatMessage(ChatMessageRequest),
}

impl ClientPacket {
    /// Parse and validate one inbound text frame
    pub fn parse(text: &str) -> Result<Self, PacketError> {
        let raw: RawPacket = serde_json::from_str(text)
            .map_err(|e| PacketError::InvalidEnvelope(e.to_string()))?;

        match raw.kind.as_str() {
            kind::ONLINE_USERS_QUERY => match &raw.payload {
                serde_json::Value::Null => Ok(Self::OnlineUsersQuery),
                serde_json::Value::Object(map) if map.is_empty() => Ok(Self::OnlineUsersQuery),
                _ => Err(PacketError::malformed(
                    kind::ONLINE_USERS_QUERY,
                    "payload must be empty",
                )),
            },
            kind::CHAT_MESSAGE => serde_json::from_value(raw.payload)
                .map(Self::ChatMessage)
                .map_err(|e| PacketError::malformed(kind::CHAT_MESSAGE, e)),
            _ => Err(PacketError::UnknownKind(raw.kind)),
        }
    }
}

/// Payload of an outbound `chat_message`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessagePayload {
    pub id: String,
    pub channel_id: String,
    pub sender_id: String,
    pub content: String,
    /// RFC 3339
    pub created_at: String,
    /// RFC 3339, `null` when the message was never edited
    pub edited_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineNoticePayload {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUsersPayload {
    pub user_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub reason: String,
    pub message: String,
}

impl ErrorPayload {
    pub fn new(reason: &str, message: impl Into<String>) -> Self {
        Self {
            reason: reason.to_string(),
            message: message.into(),
        }
    }
}

/// Packets the server sends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum ServerPacket {
    ChatMessage(ChatMessagePayload),
    OfflineNotice(OfflineNoticePayload),
    OnlineUsers(OnlineUsersPayload),
    Error(ErrorPayload),
}

impl ServerPacket {
    /// Encode as a JSON text frame
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
