//! Events fanned out to every live connection.

use async_trait::async_trait;

use super::{entity::ChatMessage, error::BroadcastError, value_object::UserId};

/// An event every registered connection receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A chat message was accepted (and persisted, when its channel requires it)
    MessagePosted(ChatMessage),
    /// A user's connection is going away
    UserWentOffline(UserId),
}

/// Hands events to the hub for fan-out.
///
/// Returns once the hub has applied the broadcast; delivery to individual
/// connections is best-effort.
#[async_trait]
pub trait EventBroadcaster: Send + Sync {
    async fn broadcast(&self, event: ChatEvent) -> Result<(), BroadcastError>;
}
