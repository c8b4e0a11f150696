//! Shared helpers for the in-process integration tests.
//!
//! Each test starts the real router on an ephemeral port and talks to it over
//! WebSocket (tokio-tungstenite) and HTTP (reqwest).

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::{net::TcpStream, task::JoinHandle};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message, client::IntoClientRequest, http::HeaderValue},
};
use tsudoi_server::{
    config::{SeedData, ServerConfig},
    domain::{ChatMessage, MessageId, MessageRepository, RepositoryError},
    infrastructure::{
        hub::{Hub, HubHandle},
        repository::{
            InMemoryChannelRepository, InMemoryFileRepository, InMemoryMessageRepository,
            InMemorySessionRepository,
        },
    },
    ui::{HandlerSettings, Server},
    usecase::{AuthenticateUseCase, GetFileUseCase, SendMessageUseCase, UploadFileUseCase},
};
use tsudoi_shared::time::SystemClock;

/// How long a test waits for a frame it expects
pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Channels and sessions every test server starts with
const SEED: &str = r#"{
    "channels": [
        {"id": "c1", "persistenceEnabled": true},
        {"id": "lobby", "persistenceEnabled": false}
    ],
    "sessions": [
        {"token": "token-u1", "userId": "u1"},
        {"token": "token-u2", "userId": "u2"},
        {"token": "token-u3", "userId": "u3"}
    ]
}"#;

/// Message store that is always down
pub struct UnavailableMessageRepository;

#[async_trait]
impl MessageRepository for UnavailableMessageRepository {
    async fn insert(&self, _message: &ChatMessage) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database is down".to_string()))
    }

    async fn find_by_id(&self, _id: &MessageId) -> Result<Option<ChatMessage>, RepositoryError> {
        Err(RepositoryError::Unavailable("database is down".to_string()))
    }
}

/// In-process server bound to an ephemeral port
pub struct TestServer {
    addr: SocketAddr,
    pub hub: HubHandle,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Start a server backed by the given message store
    pub async fn start(messages: Arc<dyn MessageRepository>) -> Self {
        let config = ServerConfig::default();
        let seed = SeedData::from_json(SEED).unwrap();

        let (hub, _hub_task) = Hub::spawn(config.hub_command_buffer);
        let files = Arc::new(InMemoryFileRepository::new());
        let server = Server::new(
            hub.clone(),
            Arc::new(AuthenticateUseCase::new(Arc::new(
                InMemorySessionRepository::with_sessions(seed.sessions()),
            ))),
            Arc::new(SendMessageUseCase::new(
                Arc::new(InMemoryChannelRepository::with_channels(seed.channels())),
                messages,
                Arc::new(hub.clone()),
                Arc::new(SystemClock),
            )),
            Arc::new(UploadFileUseCase::new(files.clone())),
            Arc::new(GetFileUseCase::new(files)),
            HandlerSettings::from(&config),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = server.router();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer { addr, hub, task }
    }

    /// Start a server with an in-memory message store
    pub async fn start_in_memory() -> (Self, Arc<InMemoryMessageRepository>) {
        let messages = Arc::new(InMemoryMessageRepository::new());
        (Self::start(messages.clone()).await, messages)
    }

    /// Get the WebSocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Wait until the hub reports exactly `expected` connections
    pub async fn wait_for_connections(&self, expected: usize) {
        tokio::time::timeout(RECV_TIMEOUT, async {
            while self.hub.connection_count().await.unwrap() != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("hub never reached {expected} connection(s)"));
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// WebSocket client speaking the packet protocol
pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Connect with the token in the query string
    pub async fn connect(server: &TestServer, token: &str) -> Result<Self, tungstenite::Error> {
        let url = format!("{}?token={}", server.ws_url(), token);
        let (stream, _) = connect_async(url).await?;
        Ok(Self { stream })
    }

    /// Connect with the token in the `token` header
    pub async fn connect_with_header(
        server: &TestServer,
        token: &str,
    ) -> Result<Self, tungstenite::Error> {
        let mut request = server.ws_url().into_client_request()?;
        request
            .headers_mut()
            .insert("token", HeaderValue::from_str(token).unwrap());
        let (stream, _) = connect_async(request).await?;
        Ok(Self { stream })
    }

    /// Connect and wait until the hub has registered the connection
    pub async fn join(server: &TestServer, token: &str, expected_connections: usize) -> Self {
        let client = Self::connect(server, token).await.unwrap();
        server.wait_for_connections(expected_connections).await;
        client
    }

    pub async fn send_raw(&mut self, text: &str) {
        self.stream.send(Message::text(text.to_string())).await.unwrap();
    }

    pub async fn send_json(&mut self, packet: Value) {
        self.send_raw(&packet.to_string()).await;
    }

    pub async fn send_chat(&mut self, channel_id: &str, content: &str) {
        self.send_json(serde_json::json!({
            "kind": "chat_message",
            "payload": {"channelId": channel_id, "content": content}
        }))
        .await;
    }

    /// Receive the next text frame as JSON, failing after `RECV_TIMEOUT`
    pub async fn recv_json(&mut self) -> Value {
        tokio::time::timeout(RECV_TIMEOUT, async {
            loop {
                match self.stream.next().await {
                    Some(Ok(Message::Text(text))) => {
                        return serde_json::from_str::<Value>(text.as_str()).unwrap();
                    }
                    Some(Ok(Message::Close(_))) | None => panic!("connection closed"),
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => panic!("websocket error: {e}"),
                }
            }
        })
        .await
        .expect("no frame received in time")
    }

    /// Assert that no text frame arrives within `duration`
    pub async fn expect_silence(&mut self, duration: Duration) {
        let result = tokio::time::timeout(duration, async {
            loop {
                match self.stream.next().await {
                    Some(Ok(Message::Text(text))) => return text.as_str().to_string(),
                    Some(Ok(_)) => continue,
                    _ => std::future::pending::<()>().await,
                }
            }
        })
        .await;
        if let Ok(frame) = result {
            panic!("unexpected frame: {frame}");
        }
    }

    /// Wait for the server to close the connection
    pub async fn expect_closed(&mut self) {
        tokio::time::timeout(RECV_TIMEOUT, async {
            loop {
                match self.stream.next().await {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return,
                    Some(Ok(_)) => continue,
                }
            }
        })
        .await
        .expect("connection was not closed in time");
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}

/// HTTP status of a rejected WebSocket handshake
pub fn handshake_status(error: tungstenite::Error) -> u16 {
    match error {
        tungstenite::Error::Http(response) => response.status().as_u16(),
        other => panic!("handshake failed without an HTTP response: {other}"),
    }
}
