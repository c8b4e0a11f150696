//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    infrastructure::hub::HubHandle,
    usecase::{AuthenticateUseCase, GetFileUseCase, SendMessageUseCase, UploadFileUseCase},
};

use super::{
    handler::{
        download_file, file_info, health_check, online_users, upload_file, websocket_handler,
    },
    signal::shutdown_signal,
    state::{AppState, HandlerSettings},
};

/// WebSocket chat relay server
///
/// # Example
///
/// ```ignore
/// let (hub, _hub_task) = Hub::spawn(config.hub_command_buffer);
/// let server = Server::new(
///     hub,
///     authenticate_usecase,
///     send_message_usecase,
///     upload_file_usecase,
///     get_file_usecase,
///     HandlerSettings::from(&config),
/// );
/// server.run(config.host, config.port).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `hub` - Handle of the running hub
    /// * `authenticate_usecase` - UseCase resolving session tokens
    /// * `send_message_usecase` - UseCase for message sending
    /// * `upload_file_usecase` - UseCase for file upload
    /// * `get_file_usecase` - UseCase for file download
    /// * `settings` - Per-connection and per-request limits
    pub fn new(
        hub: HubHandle,
        authenticate_usecase: Arc<AuthenticateUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        upload_file_usecase: Arc<UploadFileUseCase>,
        get_file_usecase: Arc<GetFileUseCase>,
        settings: HandlerSettings,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                hub,
                authenticate_usecase,
                send_message_usecase,
                upload_file_usecase,
                get_file_usecase,
                settings,
            }),
        }
    }

    /// Build the router with every endpoint
    pub fn router(&self) -> Router {
        let upload_limit = DefaultBodyLimit::max(self.state.settings.max_upload_bytes);

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/users/online", get(online_users))
            .route("/api/files", post(upload_file).layer(upload_limit))
            .route("/api/files/{file_id}", get(download_file))
            .route("/api/files/{file_id}/info", get(file_info))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on an already bound listener until a shutdown signal arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails while accepting connections.
    pub async fn serve(self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        tracing::info!("Chat relay listening on {}", listener.local_addr()?);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Run the chat relay server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;
        tracing::info!("Connect to: ws://{}/ws?token=<token>", bind_addr);

        self.serve(listener).await
    }
}
