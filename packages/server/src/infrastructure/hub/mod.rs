//! Hub: 接続レジストリを所有する単一のコーディネーター
//!
//! ## 責務
//!
//! - 接続レジストリ（user id → `ConnectionHandle`）の唯一の所有者
//! - register / unregister / broadcast / route を 1 つのタスクで直列化
//! - ファンアウト（全登録接続への配送）
//!
//! ## 設計ノート
//!
//! Hub はソケットに直接書き込みません。各接続の送信キューに `try_send` で
//! フレームを渡すだけなので、遅い接続や死んだ接続が Hub を止めることはありません。
//! キューが満杯の接続はそのイベントの配送対象から外され、以降のファンアウトでも
//! スキップされ、自身の teardown を促す通知を受け取ります。レジストリからの削除は
//! その teardown（offline_notice → unregister）に任せるため、離脱の通知より先に
//! 一覧から消えることはありません。
//!
//! 呼び出し側は `HubHandle`（mpsc の送信側）経由でのみ Hub に到達します。
//! 同じハンドルから送られた操作は送信順に適用されます。

mod registry;

use async_trait::async_trait;
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::{
    domain::{BroadcastError, ChatEvent, ConnectionId, EventBroadcaster, UserId},
    infrastructure::dto::websocket::ServerPacket,
};

pub use registry::{ConnectionHandle, OutboundError, Registry};

/// Commands queued for the hub before callers start to wait
pub const DEFAULT_COMMAND_BUFFER: usize = 1024;

/// Hub errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HubError {
    #[error("User '{0}' already has a live connection")]
    AlreadyRegistered(UserId),

    #[error("Hub is not running")]
    Closed,
}

/// Outcome of one fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections whose queue accepted the frame
    pub delivered: usize,
    /// Stalled, closed or already evicted connections skipped by this fan-out
    pub dropped: usize,
}

type RouteFn = Box<dyn FnOnce(&Registry) + Send>;

enum HubCommand {
    Register {
        handle: ConnectionHandle,
        reply: oneshot::Sender<Result<(), HubError>>,
    },
    Unregister {
        user_id: UserId,
        connection_id: ConnectionId,
        reply: oneshot::Sender<bool>,
    },
    Broadcast {
        frame: String,
        reply: oneshot::Sender<BroadcastReport>,
    },
    Route(RouteFn),
}

/// The coordinator task state
pub struct Hub {
    registry: Registry,
    commands: mpsc::Receiver<HubCommand>,
}

impl Hub {
    /// Spawn the hub task
    ///
    /// The task runs until every `HubHandle` has been dropped.
    ///
    /// # Arguments
    ///
    /// * `buffer` - Capacity of the command queue
    pub fn spawn(buffer: usize) -> (HubHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let hub = Self {
            registry: Registry::default(),
            commands: rx,
        };
        let task = tokio::spawn(hub.run());
        (HubHandle { commands: tx }, task)
    }

    async fn run(mut self) {
        tracing::debug!("Hub started");
        while let Some(command) = self.commands.recv().await {
            self.apply(command);
        }
        tracing::info!(
            "Hub stopped with {} connection(s) still registered",
            self.registry.len()
        );
    }

    fn apply(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register { handle, reply } => {
                let user_id = handle.user_id().clone();
                let result = self.registry.insert(handle);
                match &result {
                    Ok(()) => tracing::info!(
                        "'{}' registered, {} online",
                        user_id,
                        self.registry.len()
                    ),
                    Err(e) => tracing::warn!("Rejected registration: {}", e),
                }
                let _ = reply.send(result);
            }
            HubCommand::Unregister {
                user_id,
                connection_id,
                reply,
            } => {
                let removed = self.registry.remove(&user_id, &connection_id);
                if removed {
                    tracing::info!(
                        "'{}' unregistered, {} online",
                        user_id,
                        self.registry.len()
                    );
                } else {
                    tracing::debug!("'{}' was not registered, nothing to remove", user_id);
                }
                let _ = reply.send(removed);
            }
            HubCommand::Broadcast { frame, reply } => {
                let report = self.registry.fan_out(&frame);
                tracing::debug!(
                    "Broadcast delivered to {}, dropped {}",
                    report.delivered,
                    report.dropped
                );
                let _ = reply.send(report);
            }
            HubCommand::Route(route) => route(&self.registry),
        }
    }
}

/// Cloneable entry point to the hub
#[derive(Debug, Clone)]
pub struct HubHandle {
    commands: mpsc::Sender<HubCommand>,
}

impl std::fmt::Debug for HubCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Register { .. } => "Register",
            Self::Unregister { .. } => "Unregister",
            Self::Broadcast { .. } => "Broadcast",
            Self::Route(_) => "Route",
        };
        f.write_str(name)
    }
}

impl HubHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> HubCommand,
    ) -> Result<T, HubError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| HubError::Closed)?;
        response.await.map_err(|_| HubError::Closed)
    }

    /// Add a connection under its user id.
    ///
    /// Fails with `AlreadyRegistered` when the user already has a live
    /// connection; the existing entry is left untouched.
    pub async fn register(&self, handle: ConnectionHandle) -> Result<(), HubError> {
        self.request(|reply| HubCommand::Register { handle, reply })
            .await?
    }

    /// Remove a connection. Returns whether an entry was removed.
    pub async fn unregister(&self, handle: &ConnectionHandle) -> Result<bool, HubError> {
        let user_id = handle.user_id().clone();
        let connection_id = handle.connection_id().clone();
        self.request(|reply| HubCommand::Unregister {
            user_id,
            connection_id,
            reply,
        })
        .await
    }

    /// Fan an encoded frame out to every registered connection
    pub async fn broadcast_frame(&self, frame: String) -> Result<BroadcastReport, HubError> {
        self.request(|reply| HubCommand::Broadcast { frame, reply })
            .await
    }

    /// Run `query` against the registry inside the hub task and return its result
    pub async fn route<R, F>(&self, query: F) -> Result<R, HubError>
    where
        F: FnOnce(&Registry) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.request(|reply| {
            HubCommand::Route(Box::new(move |registry: &Registry| {
                let _ = reply.send(query(registry));
            }))
        })
        .await
    }

    /// User ids with a live connection, sorted
    pub async fn online_users(&self) -> Result<Vec<UserId>, HubError> {
        self.route(Registry::user_ids).await
    }

    pub async fn is_online(&self, user_id: &UserId) -> Result<bool, HubError> {
        let user_id = user_id.clone();
        self.route(move |registry| registry.contains(&user_id)).await
    }

    pub async fn connection_count(&self) -> Result<usize, HubError> {
        self.route(Registry::len).await
    }
}

#[async_trait]
impl EventBroadcaster for HubHandle {
    async fn broadcast(&self, event: ChatEvent) -> Result<(), BroadcastError> {
        let frame = ServerPacket::from(event)
            .to_frame()
            .map_err(|e| BroadcastError::Encode(e.to_string()))?;
        self.broadcast_frame(frame)
            .await
            .map(|_| ())
            .map_err(|_| BroadcastError::HubClosed)
    }
}
