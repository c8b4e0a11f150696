//! Server state shared by every handler.

use std::{sync::Arc, time::Duration};

use crate::{
    config::ServerConfig,
    infrastructure::hub::HubHandle,
    usecase::{AuthenticateUseCase, GetFileUseCase, SendMessageUseCase, UploadFileUseCase},
};

/// Settings the handlers and connection actors read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerSettings {
    /// Frames queued per connection before the hub treats it as stalled
    pub outbound_buffer: usize,
    /// How long a direct reply may wait for room in the outbound queue
    pub reply_timeout: Duration,
    /// Largest accepted upload body
    pub max_upload_bytes: usize,
}

impl From<&ServerConfig> for HandlerSettings {
    fn from(config: &ServerConfig) -> Self {
        Self {
            outbound_buffer: config.outbound_buffer,
            reply_timeout: config.reply_timeout,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Shared application state
pub struct AppState {
    /// Hub（接続レジストリへの唯一の入口）
    pub hub: HubHandle,
    /// AuthenticateUseCase（トークン認証のユースケース）
    pub authenticate_usecase: Arc<AuthenticateUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// UploadFileUseCase（ファイルアップロードのユースケース）
    pub upload_file_usecase: Arc<UploadFileUseCase>,
    /// GetFileUseCase（ファイル取得のユースケース）
    pub get_file_usecase: Arc<GetFileUseCase>,
    pub settings: HandlerSettings,
}
