//! # Event Subscriber
//!
//! Receiving side of the outcome bus.

use crate::events::{CertificateProcessed, EventFilter};
use tokio::sync::broadcast;
use tracing::warn;

/// A filtered receiver of outcomes. Dropping it unsubscribes.
pub struct Subscription {
    receiver: broadcast::Receiver<CertificateProcessed>,
    filter: EventFilter,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<CertificateProcessed>,
        filter: EventFilter,
    ) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next outcome that matches the filter.
    ///
    /// Returns `None` once the bus is dropped. A subscriber that fell behind
    /// logs how many notifications it skipped and resumes with the oldest
    /// one still buffered.
    pub async fn recv(&mut self) -> Option<CertificateProcessed> {
        loop {
            let event = match self.receiver.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        skipped,
                        correlation_id = ?self.filter.correlation_id,
                        "Outcome subscriber lagged, notifications skipped"
                    );
                    continue;
                }
            };

            if self.filter.matches(&event) {
                return Some(event);
            }
        }
    }
}
