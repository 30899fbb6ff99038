//! # Envelope Intake Service
//!
//! Application service implementing `EnvelopeIntakeApi`: access guard first,
//! then the envelope opener.

use crate::domain::errors::IntakeError;
use crate::domain::guard::authorize;
use crate::ports::inbound::EnvelopeIntakeApi;
use crate::ports::outbound::EnvelopeOpener;
use shared_types::{EventHeaders, VoteConfirmationPayload};
use tracing::warn;

/// Envelope intake service.
pub struct EnvelopeIntakeService<O: EnvelopeOpener> {
    opener: O,
    /// Expected credential. Empty means none configured, which rejects all events.
    expected_api_key: String,
}

impl<O: EnvelopeOpener> EnvelopeIntakeService<O> {
    /// Create a new intake service.
    ///
    /// # Arguments
    /// * `opener` - Opens envelopes that passed the access guard
    /// * `expected_api_key` - Configured credential, if any
    pub fn new(opener: O, expected_api_key: Option<String>) -> Self {
        if expected_api_key.as_deref().map_or(true, str::is_empty) {
            warn!("CERTIFICATE_INTERNAL_API_KEY is not set; every event will be rejected");
        }
        Self {
            opener,
            expected_api_key: expected_api_key.unwrap_or_default(),
        }
    }
}

impl<O: EnvelopeOpener> EnvelopeIntakeApi for EnvelopeIntakeService<O> {
    fn open(&self, headers: &EventHeaders) -> Result<VoteConfirmationPayload, IntakeError> {
        authorize(headers.api_key.as_deref(), &self.expected_api_key)?;

        let envelope = match headers.security_envelope.as_deref() {
            Some(envelope) if !envelope.is_empty() => envelope,
            _ => {
                warn!("Event without security envelope");
                return Err(IntakeError::MissingEnvelope);
            }
        };

        Ok(self.opener.unpack(envelope)?)
    }
}
