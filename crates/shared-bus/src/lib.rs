//! # Shared Bus - In-Process Messaging
//!
//! Two channels connect the transport and the pipeline:
//!
//! ```text
//! ┌──────────────┐  IntakeSender   ┌──────────────┐   CertificateProcessed   ┌───────────┐
//! │  Transport   │ ──(mpsc)──────→ │   Handler    │ ──(broadcast)──────────→ │ Observers │
//! │              │ ←─(oneshot)──── │              │                          └───────────┘
//! └──────────────┘  ProcessResult  └──────────────┘
//! ```
//!
//! - **Intake queue** (`intake`): bounded and lossless. Senders wait when it
//!   is full, and request/reply frames get their outcome on a oneshot.
//! - **Outcome bus** (`InMemoryEventBus`): fan-out notifications. A slow
//!   subscriber skips old notifications rather than stalling the pipeline.
//!
//! ## Redelivery
//!
//! The transport offers at-least-once delivery at best. `RedeliveryWindow`
//! is a sliding-window claim table the issuance stage can use to suppress a
//! second certificate for the same voter.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod intake;
pub mod publisher;
pub mod redelivery;
pub mod subscriber;

// Re-export main types
pub use events::{CertificateProcessed, EventFilter};
pub use intake::{
    intake_channel, IntakeClosed, IntakeDelivery, IntakeReceiver, IntakeSender,
    DEFAULT_INTAKE_CAPACITY,
};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use redelivery::{RedeliveryError, RedeliveryWindow};
pub use subscriber::Subscription;

/// Outcome notifications buffered per subscriber before it lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
