//! Connection actor: one per live WebSocket.
//!
//! ## 責務
//!
//! - ソケットの所有（reader はこのタスク、writer は専用タスク）
//! - 受信フレームを `ClientPacket` にパースしてディスパッチ
//! - 送信はすべて自分の送信キュー経由（writer タスクだけがソケットに書き込む）
//! - 切断時の teardown を 1 回だけ実行（offline_notice → unregister → close）
//!
//! ## ライフサイクル
//!
//! ```text
//! upgrade → register ─┬─ Ok  → read loop → teardown → close
//!                     └─ Err → error{duplicate_session} → close
//! ```

use std::{sync::Arc, time::Duration};

use axum::extract::ws::{Message, WebSocket};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, Stream, StreamExt},
};
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{ChatEvent, EventBroadcaster, UserId},
    infrastructure::{
        dto::websocket::{ClientPacket, ErrorPayload, PacketError, ServerPacket, reason},
        hub::{ConnectionHandle, HubError, HubHandle},
    },
    usecase::{SendMessageError, SendMessageUseCase},
};

/// How long the writer may take to flush and close after teardown
const CLOSE_GRACE: Duration = Duration::from_secs(5);

/// Errors raised while handling one inbound frame.
///
/// None of them closes the connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Packet(#[from] PacketError),

    #[error(transparent)]
    SendMessage(#[from] SendMessageError),

    #[error(transparent)]
    Hub(#[from] HubError),
}

pub struct ConnectionActor {
    handle: ConnectionHandle,
    hub: HubHandle,
    send_message: Arc<SendMessageUseCase>,
    reply_timeout: Duration,
}

impl ConnectionActor {
    pub fn new(
        handle: ConnectionHandle,
        hub: HubHandle,
        send_message: Arc<SendMessageUseCase>,
        reply_timeout: Duration,
    ) -> Self {
        Self {
            handle,
            hub,
            send_message,
            reply_timeout,
        }
    }

    pub fn user_id(&self) -> &UserId {
        self.handle.user_id()
    }

    /// Drive the connection until the socket closes.
    ///
    /// # Arguments
    ///
    /// * `socket` - The upgraded WebSocket, owned by this actor from now on
    /// * `outbound` - Receiving end of the queue created with the actor's handle
    pub async fn run(self, socket: WebSocket, outbound: mpsc::Receiver<String>) {
        let (sink, stream) = socket.split();
        let mut writer = tokio::spawn(writer_loop(outbound, sink));
        let writer_finished = self.serve(stream, &mut writer).await;

        // Dropping the actor releases the last sender of the outbound queue;
        // the writer then flushes what is left and closes the socket.
        drop(self);
        if !writer_finished && tokio::time::timeout(CLOSE_GRACE, &mut writer).await.is_err() {
            tracing::warn!("Writer did not finish within {:?}, aborting", CLOSE_GRACE);
            writer.abort();
        }
    }

    /// Register, read until the connection ends, then tear down.
    ///
    /// A refused registration skips both the read loop and the teardown, so the
    /// session already online is neither touched nor announced as offline.
    /// Returns `true` when the writer task has already finished.
    async fn serve<S>(&self, stream: S, writer: &mut JoinHandle<()>) -> bool
    where
        S: Stream<Item = Result<Message, axum::Error>> + Unpin,
    {
        if !self.admit().await {
            return false;
        }
        let writer_finished = self.read_loop(stream, writer).await;
        self.teardown().await;
        writer_finished
    }

    /// Returns whether the hub accepted this connection
    async fn admit(&self) -> bool {
        match self.hub.register(self.handle.clone()).await {
            Ok(()) => {
                tracing::info!("'{}' connected", self.user_id());
                true
            }
            Err(e) => {
                tracing::warn!("Refusing connection of '{}': {}", self.user_id(), e);
                let reason = match e {
                    HubError::AlreadyRegistered(_) => reason::DUPLICATE_SESSION,
                    HubError::Closed => reason::INTERNAL,
                };
                self.reply(ServerPacket::Error(ErrorPayload::new(reason, e.to_string())))
                    .await;
                false
            }
        }
    }

    /// Returns `true` when the loop ended because the writer task finished.
    async fn read_loop<S>(&self, mut stream: S, writer: &mut JoinHandle<()>) -> bool
    where
        S: Stream<Item = Result<Message, axum::Error>> + Unpin,
    {
        loop {
            tokio::select! {
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received from '{}': {}", self.user_id(), text.as_str());
                        if let Err(e) = self.dispatch(text.as_str()).await {
                            tracing::warn!("Frame from '{}' not handled: {}", self.user_id(), e);
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        tracing::warn!("Ignoring binary frame from '{}'", self.user_id());
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("'{}' requested close", self.user_id());
                        return false;
                    }
                    // Ping/pong is handled automatically by the WebSocket protocol
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error on '{}': {}", self.user_id(), e);
                        return false;
                    }
                    None => return false,
                },
                _ = self.handle.evicted() => {
                    tracing::warn!("'{}' was evicted by the hub", self.user_id());
                    return false;
                }
                _ = &mut *writer => {
                    tracing::debug!("Writer of '{}' stopped", self.user_id());
                    return true;
                }
            }
        }
    }

    /// Handle one inbound text frame
    pub async fn dispatch(&self, text: &str) -> Result<(), ConnectionError> {
        match ClientPacket::parse(text)? {
            ClientPacket::OnlineUsersQuery => {
                let user_ids = self.hub.online_users().await?;
                self.reply(ServerPacket::OnlineUsers(user_ids.into())).await;
                Ok(())
            }
            ClientPacket::ChatMessage(request) => {
                let (channel_id, content) = request.into_domain()?;
                match self
                    .send_message
                    .execute(self.user_id().clone(), channel_id, content)
                    .await
                {
                    Ok(message) => {
                        tracing::debug!(
                            "'{}' posted '{}' to '{}'",
                            message.sender_id,
                            message.id,
                            message.channel_id
                        );
                        Ok(())
                    }
                    Err(e) => {
                        let reason = match &e {
                            SendMessageError::ChannelNotFound(_) => reason::CHANNEL_NOT_FOUND,
                            SendMessageError::PersistenceFailed(_)
                            | SendMessageError::PersistenceTimedOut(_) => {
                                reason::PERSISTENCE_FAILED
                            }
                            _ => reason::INTERNAL,
                        };
                        self.reply(ServerPacket::Error(ErrorPayload::new(reason, e.to_string())))
                            .await;
                        Err(e.into())
                    }
                }
            }
        }
    }

    /// Send a packet to this connection only. Failures are logged.
    async fn reply(&self, packet: ServerPacket) {
        let frame = match packet.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Failed to encode reply for '{}': {}", self.user_id(), e);
                return;
            }
        };
        if let Err(e) = self.handle.send(frame, self.reply_timeout).await {
            tracing::warn!("Failed to reply to '{}': {}", self.user_id(), e);
        }
    }

    /// Announce the departure, then leave the registry.
    ///
    /// The notice is fanned out before the unregistration is applied, so no
    /// observer sees the user vanish from the online list first.
    async fn teardown(&self) {
        let user_id = self.user_id().clone();
        if let Err(e) = self
            .hub
            .broadcast(ChatEvent::UserWentOffline(user_id.clone()))
            .await
        {
            tracing::warn!("Failed to broadcast offline notice for '{}': {}", user_id, e);
        }

        match self.hub.unregister(&self.handle).await {
            Ok(true) => tracing::info!("'{}' disconnected", user_id),
            Ok(false) => tracing::debug!("'{}' was already removed from the hub", user_id),
            Err(e) => tracing::warn!("Failed to unregister '{}': {}", user_id, e),
        }
    }
}

/// Drain the outbound queue into the socket until every sender is gone
async fn writer_loop(
    mut outbound: mpsc::Receiver<String>,
    mut sink: SplitSink<WebSocket, Message>,
) {
    while let Some(frame) = outbound.recv().await {
        if let Err(e) = sink.send(Message::Text(frame.into())).await {
            tracing::debug!("Socket write failed: {}", e);
            return;
        }
    }
    let _ = sink.close().await;
}
