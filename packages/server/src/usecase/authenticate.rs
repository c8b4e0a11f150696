//! UseCase: トークン認証
//!
//! 接続確立前（WebSocket upgrade 前）とファイルアップロード時に一度だけ呼ばれます。

use std::sync::Arc;

use crate::domain::{SessionRepository, UserId};

use super::error::AuthError;

/// トークンからユーザー ID を解決するユースケース
pub struct AuthenticateUseCase {
    sessions: Arc<dyn SessionRepository>,
}

impl AuthenticateUseCase {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    /// トークンを検証してユーザー ID を返す
    ///
    /// # Returns
    ///
    /// * `Ok(UserId)` - 認証成功
    /// * `Err(AuthError::Unauthorized)` - トークンが空、または未知
    /// * `Err(AuthError::Repository)` - セッション検索の失敗
    pub async fn execute(&self, token: &str) -> Result<UserId, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::Unauthorized);
        }

        self.sessions
            .find_user_id_by_token(token)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?
            .ok_or(AuthError::Unauthorized)
    }
}
