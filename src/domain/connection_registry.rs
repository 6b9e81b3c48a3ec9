//! Registry of live outbound channels used for broadcast fan-out.
//!
//! Every live connection registers the sending half of a bounded
//! [`tokio::sync::mpsc`] queue. Delivery uses `try_send`, so a slow or
//! stalled client fills only its own queue and never blocks the caller
//! or the other recipients.

use std::collections::HashMap;

use axum::extract::ws::Utf8Bytes;
use tokio::sync::{RwLock, mpsc};

use super::PlayerId;
use crate::error::DeliveryError;

/// Serialized frame queued for delivery to a connection.
pub type Frame = Utf8Bytes;

/// Outcome of a single fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Recipients whose queue accepted the frame.
    pub delivered: usize,
    /// Recipients that were skipped (full queue or closed writer).
    pub dropped: usize,
}

/// The set of live connections, keyed by connection id.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    senders: RwLock<HashMap<PlayerId, mpsc::Sender<Frame>>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the outbound queue for a connection.
    ///
    /// Returns `false` without replacing anything if the id is already
    /// registered.
    pub async fn register(&self, id: PlayerId, sender: mpsc::Sender<Frame>) -> bool {
        let mut map = self.senders.write().await;
        if map.contains_key(&id) {
            return false;
        }
        map.insert(id, sender);
        true
    }

    /// Removes a connection's queue. Dropping the sender lets the
    /// connection's writer drain and exit.
    pub async fn unregister(&self, id: &PlayerId) -> bool {
        self.senders.write().await.remove(id).is_some()
    }

    /// Queues a frame for a single connection.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] if the connection is unknown, its queue
    /// is full, or its writer has exited.
    pub async fn send_to(&self, id: &PlayerId, frame: Frame) -> Result<(), DeliveryError> {
        let map = self.senders.read().await;
        let sender = map.get(id).ok_or(DeliveryError::NotRegistered)?;
        sender.try_send(frame).map_err(DeliveryError::from)
    }

    /// Queues the same frame for every registered connection.
    ///
    /// Failures are isolated per recipient and only counted.
    pub async fn broadcast(&self, frame: &Frame) -> BroadcastReport {
        let map = self.senders.read().await;
        let mut report = BroadcastReport::default();
        for (id, sender) in map.iter() {
            match sender.try_send(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    report.dropped += 1;
                    tracing::debug!(player_id = %id, error = %DeliveryError::from(err), "broadcast frame dropped");
                }
            }
        }
        report
    }

    /// Returns the number of live connections.
    pub async fn len(&self) -> usize {
        self.senders.read().await.len()
    }

    /// Returns `true` if there are no live connections.
    pub async fn is_empty(&self) -> bool {
        self.senders.read().await.is_empty()
    }
}
