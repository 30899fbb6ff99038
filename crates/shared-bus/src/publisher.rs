//! # Event Publisher
//!
//! Publishing side of the outcome bus.

use crate::events::{CertificateProcessed, EventFilter};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

/// Trait for publishing outcomes to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an outcome.
    ///
    /// # Returns
    ///
    /// The number of active subscribers that received it.
    async fn publish(&self, event: CertificateProcessed) -> usize;
}

/// In-memory outcome bus over `tokio::sync::broadcast`.
///
/// Fan-out only: a subscriber that falls more than the channel capacity
/// behind skips the oldest notifications (and logs it).
pub struct InMemoryEventBus {
    sender: broadcast::Sender<CertificateProcessed>,
}

impl InMemoryEventBus {
    /// Create a bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus buffering `capacity` notifications per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to outcomes matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(correlation_id = ?filter.correlation_id, "New outcome subscription");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: CertificateProcessed) -> usize {
        let correlation_id = event.correlation_id;
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(%correlation_id, receivers, "Outcome published");
                receivers
            }
            Err(_) => {
                debug!(%correlation_id, "Outcome not observed (no subscribers)");
                0
            }
        }
    }
}
