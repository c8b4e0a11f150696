//! インメモリ Session Repository 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{RepositoryError, SessionRepository, UserId};

/// Token → user id のインメモリ実装
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, UserId>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with `(token, user id)` pairs
    pub fn with_sessions(sessions: impl IntoIterator<Item = (String, UserId)>) -> Self {
        Self {
            sessions: RwLock::new(sessions.into_iter().collect()),
        }
    }

    pub async fn insert(&self, token: String, user_id: UserId) {
        self.sessions.write().await.insert(token, user_id);
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find_user_id_by_token(&self, token: &str) -> Result<Option<UserId>, RepositoryError> {
        Ok(self.sessions.read().await.get(token).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_user_by_known_token() {
        // テスト項目: 登録済みトークンからユーザー ID を解決できる
        // given (前提条件):
        let u1 = UserId::new("u1".to_string()).unwrap();
        let repository =
            InMemorySessionRepository::with_sessions([("secret".to_string(), u1.clone())]);

        // when (操作):
        let result = repository.find_user_id_by_token("secret").await;

        // then (期待する結果):
        assert_eq!(result, Ok(Some(u1)));
    }

    #[tokio::test]
    async fn test_find_user_by_unknown_token() {
        // テスト項目: 未知のトークンは None になる
        // given (前提条件):
        let repository = InMemorySessionRepository::new();

        // when (操作):
        let result = repository.find_user_id_by_token("unknown").await;

        // then (期待する結果):
        assert_eq!(result, Ok(None));
    }
}
