//! # Inbound `vote.confirmed` Event
//!
//! The gateway carries both the access credential and the secure envelope as
//! headers; the event body itself is never trusted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message pattern the service subscribes to.
pub const VOTE_CONFIRMED_PATTERN: &str = "vote.confirmed";

/// Header carrying the shared-secret access credential.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header carrying the compact JWE envelope.
pub const SECURITY_ENVELOPE_HEADER: &str = "x-security-envelope";

/// Out-of-band headers of a vote confirmation.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHeaders {
    /// Access credential.
    #[serde(rename = "x-api-key", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Secure envelope.
    #[serde(
        rename = "x-security-envelope",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub security_envelope: Option<String>,
}

impl std::fmt::Debug for EventHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHeaders")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field(
                "security_envelope",
                &self
                    .security_envelope
                    .as_ref()
                    .map(|e| format!("<{} bytes>", e.len())),
            )
            .finish()
    }
}

/// One inbound vote confirmation, as handed over by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteConfirmedEvent {
    /// Correlates log lines and the published outcome of this event.
    pub correlation_id: Uuid,
    /// Credential and envelope.
    pub headers: EventHeaders,
}

impl VoteConfirmedEvent {
    /// Wrap transport headers in a fresh event.
    pub fn new(headers: EventHeaders) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            headers,
        }
    }
}
