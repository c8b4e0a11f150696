//! 接続レジストリと接続ハンドル
//!
//! `Registry` は Hub タスクだけが所有し、変更します。
//! コネクションアクター側は `ConnectionHandle` のクローンを Hub に渡すだけで、
//! マップに直接触れることはありません。

use std::{collections::HashMap, sync::Arc, time::Duration};

use thiserror::Error;
use tokio::sync::{Notify, mpsc, mpsc::error::TrySendError};

use crate::domain::{ConnectionId, ConnectionIdFactory, UserId};

use super::{BroadcastReport, HubError};

/// Errors on the direct (non fan-out) send path of a connection
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OutboundError {
    #[error("Outbound queue is closed")]
    Closed,

    #[error("Outbound queue stayed full for {0:?}")]
    TimedOut(Duration),
}

/// Send path of one live connection.
///
/// Every frame for the socket goes through the same bounded queue, which a
/// single writer task drains. Direct replies and hub fan-out therefore never
/// interleave mid-frame.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    user_id: UserId,
    connection_id: ConnectionId,
    outbound: mpsc::Sender<String>,
    eviction: Arc<Notify>,
}

impl ConnectionHandle {
    /// Create a handle and the receiving end of its outbound queue
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user owning the connection
    /// * `capacity` - Frames the queue holds before the connection counts as stalled
    pub fn new(user_id: UserId, capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (outbound, rx) = mpsc::channel(capacity.max(1));
        let handle = Self {
            user_id,
            connection_id: ConnectionIdFactory::generate(),
            outbound,
            eviction: Arc::new(Notify::new()),
        };
        (handle, rx)
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    /// Queue a frame for this connection, waiting at most `timeout` for room
    pub async fn send(&self, frame: String, timeout: Duration) -> Result<(), OutboundError> {
        self.outbound
            .send_timeout(frame, timeout)
            .await
            .map_err(|e| match e {
                mpsc::error::SendTimeoutError::Timeout(_) => OutboundError::TimedOut(timeout),
                mpsc::error::SendTimeoutError::Closed(_) => OutboundError::Closed,
            })
    }

    /// Resolves once the hub has forcibly unregistered this connection
    pub async fn evicted(&self) {
        self.eviction.notified().await;
    }

    fn try_deliver(&self, frame: String) -> Result<(), TrySendError<String>> {
        self.outbound.try_send(frame)
    }

    fn evict(&self) {
        // notify_one stores a permit, so an actor that is not currently
        // waiting still observes the eviction.
        self.eviction.notify_one();
    }
}

/// Registry slot of one connection
#[derive(Debug)]
struct Entry {
    handle: ConnectionHandle,
    /// Set once a fan-out found the queue full or closed. The entry stays until
    /// the actor's own teardown unregisters it, so the departure notice always
    /// precedes the removal.
    evicted: bool,
}

impl Entry {
    fn evict(&mut self) {
        if !self.evicted {
            self.evicted = true;
            self.handle.evict();
        }
    }
}

/// Live connections keyed by user id
#[derive(Debug, Default)]
pub struct Registry {
    connections: HashMap<UserId, Entry>,
}

impl Registry {
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.connections.contains_key(user_id)
    }

    /// Registered user ids, sorted for consistent ordering
    pub fn user_ids(&self) -> Vec<UserId> {
        let mut user_ids: Vec<UserId> = self.connections.keys().cloned().collect();
        user_ids.sort();
        user_ids
    }

    pub(super) fn insert(&mut self, handle: ConnectionHandle) -> Result<(), HubError> {
        if self.connections.contains_key(handle.user_id()) {
            return Err(HubError::AlreadyRegistered(handle.user_id().clone()));
        }
        self.connections.insert(
            handle.user_id().clone(),
            Entry {
                handle,
                evicted: false,
            },
        );
        Ok(())
    }

    /// Remove the entry for `user_id` if it belongs to `connection_id`
    pub(super) fn remove(&mut self, user_id: &UserId, connection_id: &ConnectionId) -> bool {
        match self.connections.get(user_id) {
            Some(entry) if entry.handle.connection_id() == connection_id => {
                self.connections.remove(user_id);
                true
            }
            _ => false,
        }
    }

    /// Offer `frame` to every connection without waiting on any of them.
    ///
    /// Stalled connections (full queue) and dead ones (closed queue) are
    /// flagged, skipped from then on and signalled to tear down.
    pub(super) fn fan_out(&mut self, frame: &str) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        for (user_id, entry) in self.connections.iter_mut() {
            if entry.evicted {
                report.dropped += 1;
                continue;
            }
            match entry.handle.try_deliver(frame.to_owned()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        "Connection of '{}' is stalled, dropping it from fan-out",
                        user_id
                    );
                    entry.evict();
                    report.dropped += 1;
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!("Connection of '{}' is already closed", user_id);
                    entry.evict();
                    report.dropped += 1;
                }
            }
        }

        report
    }
}
