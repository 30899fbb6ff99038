//! # Intake Queue
//!
//! Bounded hand-off of inbound `vote.confirmed` events from the transport to
//! the handler. A full queue makes the sender wait; nothing is dropped.
//!
//! ```text
//! submit(event)  ──→ [ mpsc, capacity N ] ──→ recv() → IntakeDelivery
//! request(event) ──→          〃           ──→          └─ reply: oneshot
//!       ↑                                                      │
//!       └──────────────── ProcessResult ──────────────────────┘
//! ```

use shared_types::{ProcessResult, VoteConfirmedEvent};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Events buffered between transport and handler before senders wait.
pub const DEFAULT_INTAKE_CAPACITY: usize = 256;

/// The handler side of the queue is gone.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Intake queue closed")]
pub struct IntakeClosed;

/// One queued event and, for requests, where its outcome is owed.
#[derive(Debug)]
pub struct IntakeDelivery {
    pub event: VoteConfirmedEvent,
    pub reply: Option<oneshot::Sender<ProcessResult>>,
}

/// Transport side of the queue.
#[derive(Debug, Clone)]
pub struct IntakeSender {
    inner: mpsc::Sender<IntakeDelivery>,
}

impl IntakeSender {
    /// Queue `event` with no reply owed. Waits while the queue is full.
    ///
    /// # Errors
    ///
    /// `IntakeClosed` if the receiver was dropped.
    pub async fn submit(&self, event: VoteConfirmedEvent) -> Result<(), IntakeClosed> {
        self.inner
            .send(IntakeDelivery { event, reply: None })
            .await
            .map_err(|_| IntakeClosed)
    }

    /// Queue `event` and return the channel its outcome will arrive on.
    ///
    /// The returned receiver fails if the handler drops the delivery
    /// without answering.
    ///
    /// # Errors
    ///
    /// `IntakeClosed` if the receiver was dropped.
    pub async fn request(
        &self,
        event: VoteConfirmedEvent,
    ) -> Result<oneshot::Receiver<ProcessResult>, IntakeClosed> {
        let (reply, outcome) = oneshot::channel();
        self.inner
            .send(IntakeDelivery {
                event,
                reply: Some(reply),
            })
            .await
            .map_err(|_| IntakeClosed)?;
        Ok(outcome)
    }
}

/// Handler side of the queue.
#[derive(Debug)]
pub struct IntakeReceiver {
    inner: mpsc::Receiver<IntakeDelivery>,
}

impl IntakeReceiver {
    /// Next delivery, or `None` once every sender is gone and the queue is drained.
    pub async fn recv(&mut self) -> Option<IntakeDelivery> {
        self.inner.recv().await
    }
}

/// Create a queue holding up to `capacity` deliveries (at least one).
#[must_use]
pub fn intake_channel(capacity: usize) -> (IntakeSender, IntakeReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (IntakeSender { inner: tx }, IntakeReceiver { inner: rx })
}
