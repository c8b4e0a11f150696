//! Collaborator trait 定義
//!
//! ドメイン層が必要とする永続化・認証・チャンネル情報へのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    entity::{Channel, ChatMessage, StoredFile},
    error::RepositoryError,
    value_object::{ChannelId, FileId, MessageId, UserId},
};

/// Message persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Durably store a new message
    async fn insert(&self, message: &ChatMessage) -> Result<(), RepositoryError>;

    /// Look a message up by its id
    async fn find_by_id(&self, id: &MessageId) -> Result<Option<ChatMessage>, RepositoryError>;
}

/// Channel metadata lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChannelRepository: Send + Sync {
    async fn get_channel_by_id(&self, id: &ChannelId) -> Result<Option<Channel>, RepositoryError>;
}

/// Session lookup used to authenticate connections and uploads
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Resolve the user owning `token`; `Ok(None)` when the token is unknown
    async fn find_user_id_by_token(&self, token: &str) -> Result<Option<UserId>, RepositoryError>;
}

/// Uploaded file storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn insert(&self, file: StoredFile) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: &FileId) -> Result<Option<StoredFile>, RepositoryError>;
}
