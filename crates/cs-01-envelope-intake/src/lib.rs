//! # Envelope Intake Subsystem (CS-01)
//!
//! Turns an inbound `vote.confirmed` event into a trusted
//! [`VoteConfirmationPayload`](shared_types::VoteConfirmationPayload), or
//! rejects it.
//!
//! ## Flow
//!
//! ```text
//! headers ──→ [Access Guard] ──→ [Envelope Unpacker] ──→ payload
//!                  │                 │ decrypt (RSA-OAEP-256 + AES-GCM)
//!                  │                 │ verify  (PS256)
//!                  │                 │ parse   (JSON)
//!                  ↓                 ↓
//!          AuthorizationError   EnvelopeError
//! ```
//!
//! ## Security Notes
//!
//! - The credential is compared in constant time, and checked before any
//!   cryptographic work is attempted
//! - Every decrypt, verify or parse failure is the same opaque `EnvelopeError`;
//!   the failing stage is logged, never returned
//! - Key material is loaded once, validated up front, and shared read-only

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::envelope::{EnvelopeUnpacker, UnpackStage};
pub use domain::errors::{AuthorizationError, EnvelopeError, IntakeError, KeyLoadError};
pub use domain::guard::{authorize, constant_time_compare};
pub use domain::keys::{KeyMaterial, KeySecret};
pub use ports::inbound::EnvelopeIntakeApi;
pub use ports::outbound::EnvelopeOpener;
pub use service::EnvelopeIntakeService;
