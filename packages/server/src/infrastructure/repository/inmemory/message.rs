//! インメモリ Message Repository 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{ChatMessage, MessageId, MessageRepository, RepositoryError};

/// インメモリ Message Repository 実装
#[derive(Debug, Default)]
pub struct InMemoryMessageRepository {
    messages: RwLock<HashMap<MessageId, ChatMessage>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored messages
    pub async fn count(&self) -> usize {
        self.messages.read().await.len()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn insert(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        let mut messages = self.messages.write().await;
        if messages.contains_key(&message.id) {
            return Err(RepositoryError::AlreadyExists(
                message.id.as_str().to_string(),
            ));
        }
        messages.insert(message.id.clone(), message.clone());
        tracing::debug!("Stored message '{}'", message.id);
        Ok(())
    }

    async fn find_by_id(&self, id: &MessageId) -> Result<Option<ChatMessage>, RepositoryError> {
        Ok(self.messages.read().await.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChannelId, MessageContent, MessageIdFactory, Timestamp, UserId};

    fn sample_message() -> ChatMessage {
        ChatMessage::new(
            MessageIdFactory::generate(),
            ChannelId::new("c1".to_string()).unwrap(),
            UserId::new("u1".to_string()).unwrap(),
            MessageContent::new("hi".to_string()).unwrap(),
            Timestamp::new(1000),
        )
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        // テスト項目: 保存したメッセージを ID で取得できる
        // given (前提条件):
        let repository = InMemoryMessageRepository::new();
        let message = sample_message();

        // when (操作):
        repository.insert(&message).await.unwrap();
        let found = repository.find_by_id(&message.id).await;

        // then (期待する結果):
        assert_eq!(found, Ok(Some(message)));
        assert_eq!(repository.count().await, 1);
    }

    #[tokio::test]
    async fn test_insert_same_id_twice_fails() {
        // テスト項目: 同じ ID のメッセージは 2 回保存できない
        // given (前提条件):
        let repository = InMemoryMessageRepository::new();
        let message = sample_message();
        repository.insert(&message).await.unwrap();

        // when (操作):
        let result = repository.insert(&message).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RepositoryError::AlreadyExists(_))));
        assert_eq!(repository.count().await, 1);
    }
}
