//! Conversion logic between DTOs and domain entities.

use tsudoi_shared::time::timestamp_to_rfc3339;

use crate::domain::{ChannelId, ChatEvent, ChatMessage, MessageContent, StoredFile, UserId};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain
// ========================================

impl dto::ChatMessageRequest {
    /// Validate the payload into domain values
    pub fn into_domain(self) -> Result<(ChannelId, MessageContent), dto::PacketError> {
        let malformed = |reason: String| dto::PacketError::MalformedPayload {
            kind: dto::kind::CHAT_MESSAGE.to_string(),
            reason,
        };
        let channel_id = ChannelId::new(self.channel_id).map_err(|e| malformed(e.to_string()))?;
        let content = MessageContent::new(self.content).map_err(|e| malformed(e.to_string()))?;
        Ok((channel_id, content))
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<ChatMessage> for dto::ChatMessagePayload {
    fn from(model: ChatMessage) -> Self {
        Self {
            id: model.id.into_string(),
            channel_id: model.channel_id.into_string(),
            sender_id: model.sender_id.into_string(),
            content: model.content.into_string(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
            edited_at: model.edited_at.map(|t| timestamp_to_rfc3339(t.value())),
        }
    }
}

impl From<ChatEvent> for dto::ServerPacket {
    fn from(event: ChatEvent) -> Self {
        match event {
            ChatEvent::MessagePosted(message) => Self::ChatMessage(message.into()),
            ChatEvent::UserWentOffline(user_id) => {
                Self::OfflineNotice(dto::OfflineNoticePayload {
                    user_id: user_id.into_string(),
                })
            }
        }
    }
}

impl From<Vec<UserId>> for dto::OnlineUsersPayload {
    fn from(user_ids: Vec<UserId>) -> Self {
        Self {
            user_ids: user_ids.into_iter().map(UserId::into_string).collect(),
        }
    }
}

impl From<Vec<UserId>> for http::OnlineUsersDto {
    fn from(user_ids: Vec<UserId>) -> Self {
        Self {
            user_ids: user_ids.into_iter().map(UserId::into_string).collect(),
        }
    }
}

impl From<&StoredFile> for http::FileInfoDto {
    fn from(file: &StoredFile) -> Self {
        Self(file.name.clone(), file.size().to_string())
    }
}
