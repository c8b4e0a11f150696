//! インメモリ Channel Repository 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Channel, ChannelId, ChannelRepository, RepositoryError};

/// インメモリ Channel Repository 実装
#[derive(Debug, Default)]
pub struct InMemoryChannelRepository {
    channels: RwLock<HashMap<ChannelId, Channel>>,
}

impl InMemoryChannelRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with `channels`
    pub fn with_channels(channels: impl IntoIterator<Item = Channel>) -> Self {
        let channels = channels
            .into_iter()
            .map(|channel| (channel.id.clone(), channel))
            .collect();
        Self {
            channels: RwLock::new(channels),
        }
    }

    /// Add or replace a channel
    pub async fn upsert(&self, channel: Channel) {
        self.channels
            .write()
            .await
            .insert(channel.id.clone(), channel);
    }
}

#[async_trait]
impl ChannelRepository for InMemoryChannelRepository {
    async fn get_channel_by_id(&self, id: &ChannelId) -> Result<Option<Channel>, RepositoryError> {
        Ok(self.channels.read().await.get(id).cloned())
    }
}
