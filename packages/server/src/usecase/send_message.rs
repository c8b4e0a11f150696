//! UseCase: チャットメッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - チャンネル確認 → メッセージ生成 → （必要なら）永続化 → ブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 永続化が必要なチャンネルでは、永続化に成功した場合に限りブロードキャストされる
//! - 永続化が不要なチャンネルでは永続化を呼ばずにブロードキャストされる
//!
//! ### どのような状況を想定しているか
//! - 正常系：永続化あり／なしのチャンネルへの送信
//! - 異常系：存在しないチャンネル、永続化の失敗、永続化のタイムアウト

use std::{sync::Arc, time::Duration};

use tsudoi_shared::time::Clock;

use crate::domain::{
    ChannelId, ChannelRepository, ChatEvent, ChatMessage, EventBroadcaster, MessageContent,
    MessageIdFactory, MessageRepository, Timestamp, UserId,
};

use super::error::SendMessageError;

/// Default bound on a single persistence call
pub const DEFAULT_PERSISTENCE_TIMEOUT: Duration = Duration::from_secs(5);

/// チャットメッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// チャンネル情報（永続化の要否）
    channels: Arc<dyn ChannelRepository>,
    /// メッセージの永続化先
    messages: Arc<dyn MessageRepository>,
    /// Hub へのブロードキャスト
    broadcaster: Arc<dyn EventBroadcaster>,
    clock: Arc<dyn Clock>,
    persistence_timeout: Duration,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        channels: Arc<dyn ChannelRepository>,
        messages: Arc<dyn MessageRepository>,
        broadcaster: Arc<dyn EventBroadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            channels,
            messages,
            broadcaster,
            clock,
            persistence_timeout: DEFAULT_PERSISTENCE_TIMEOUT,
        }
    }

    /// 永続化呼び出しのタイムアウトを設定
    pub fn with_persistence_timeout(mut self, timeout: Duration) -> Self {
        self.persistence_timeout = timeout;
        self
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `sender_id` - 送信者（接続の所有ユーザー）
    /// * `channel_id` - 宛先チャンネル
    /// * `content` - メッセージ内容
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - ブロードキャスト済みのメッセージ
    /// * `Err(SendMessageError)` - 失敗（この場合ブロードキャストは行われていない）
    pub async fn execute(
        &self,
        sender_id: UserId,
        channel_id: ChannelId,
        content: MessageContent,
    ) -> Result<ChatMessage, SendMessageError> {
        // 1. チャンネルの確認
        let channel = self
            .channels
            .get_channel_by_id(&channel_id)
            .await
            .map_err(|e| SendMessageError::ChannelLookupFailed(e.to_string()))?
            .ok_or_else(|| SendMessageError::ChannelNotFound(channel_id.as_str().to_string()))?;

        // 2. メッセージの生成
        let message = ChatMessage::new(
            MessageIdFactory::generate(),
            channel.id,
            sender_id,
            content,
            Timestamp::new(self.clock.now_millis()),
        );

        // 3. 永続化（チャンネルが要求する場合のみ）
        if channel.persistence_enabled {
            tokio::time::timeout(self.persistence_timeout, self.messages.insert(&message))
                .await
                .map_err(|_| SendMessageError::PersistenceTimedOut(self.persistence_timeout))?
                .map_err(|e| SendMessageError::PersistenceFailed(e.to_string()))?;
            tracing::debug!("Persisted message '{}'", message.id);
        }

        // 4. ブロードキャスト
        self.broadcaster
            .broadcast(ChatEvent::MessagePosted(message.clone()))
            .await
            .map_err(|e| SendMessageError::BroadcastFailed(e.to_string()))?;

        Ok(message)
    }
}
