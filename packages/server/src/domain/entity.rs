//! エンティティ

use serde::{Deserialize, Serialize};

use super::value_object::{ChannelId, FileId, MessageContent, MessageId, Timestamp, UserId};

/// A chat message as created by a connection on receipt of a client chat event.
///
/// Immutable once created. `edited_at` stays `None` until an edit feature
/// exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub sender_id: UserId,
    pub content: MessageContent,
    pub created_at: Timestamp,
    pub edited_at: Option<Timestamp>,
}

impl ChatMessage {
    /// Create a new, never edited message
    pub fn new(
        id: MessageId,
        channel_id: ChannelId,
        sender_id: UserId,
        content: MessageContent,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            channel_id,
            sender_id,
            content,
            created_at,
            edited_at: None,
        }
    }
}

/// Channel metadata, read-only from the relay's point of view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    /// Whether messages must be durably stored before fan-out
    pub persistence_enabled: bool,
}

impl Channel {
    pub fn new(id: ChannelId, persistence_enabled: bool) -> Self {
        Self {
            id,
            persistence_enabled,
        }
    }
}

/// An uploaded file with its bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: FileId,
    pub owner_id: UserId,
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl StoredFile {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}
