//! # Inbound Ports (Driving Ports / API)
//!
//! What the event entry point calls.

use crate::domain::errors::IntakeError;
use shared_types::{EventHeaders, VoteConfirmationPayload};

/// Intake of one `vote.confirmed` event.
///
/// Synchronous and CPU-bound (RSA); async callers should run it on the
/// blocking pool.
pub trait EnvelopeIntakeApi: Send + Sync {
    /// Authorize the event, then open its envelope.
    ///
    /// # Errors
    /// * `IntakeError::Unauthorized` - credential missing or wrong; the envelope was not touched
    /// * `IntakeError::MissingEnvelope` - no `x-security-envelope` header
    /// * `IntakeError::InvalidEnvelope` - the envelope could not be decrypted, verified or parsed
    fn open(&self, headers: &EventHeaders) -> Result<VoteConfirmationPayload, IntakeError>;
}
