//! ドメイン層
//!
//! 値オブジェクト、エンティティ、ドメインエラー、そしてドメインが必要とする
//! 外部コラボレーター（永続化・認証・チャンネル情報・ブロードキャスト）の trait を定義します。

pub mod broadcaster;
pub mod entity;
pub mod error;
pub mod factory;
pub mod repository;
pub mod value_object;

pub use broadcaster::{ChatEvent, EventBroadcaster};
pub use entity::{Channel, ChatMessage, StoredFile};
pub use error::{BroadcastError, RepositoryError, ValueObjectError};
pub use factory::{ConnectionIdFactory, FileIdFactory, MessageIdFactory};
pub use repository::{ChannelRepository, FileRepository, MessageRepository, SessionRepository};
pub use value_object::{
    ChannelId, ConnectionId, FileId, MessageContent, MessageId, Timestamp, UserId,
};
