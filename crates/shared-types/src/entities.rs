//! # Domain Entities
//!
//! The plaintext payload carried by a vote confirmation and the structured
//! outcome of processing it.

use serde::{Deserialize, Serialize};

/// Plaintext recovered from a successfully opened envelope.
///
/// Field names follow the gateway's wire format. `nombres`, `cedula` and
/// `email` must be non-empty before a certificate is issued; the envelope
/// layer only guarantees the shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteConfirmationPayload {
    /// Voter's full name.
    #[serde(default)]
    pub nombres: String,
    /// National identity number.
    #[serde(default)]
    pub cedula: String,
    /// Delivery address for the certificate.
    #[serde(default)]
    pub email: String,
    /// Voting location, when the gateway knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recinto: Option<String>,
}

/// Outcome of one pipeline run.
///
/// This is the only observable result; it is logged, published on the bus
/// and, for request/reply frames, written back to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// `true` only when the certificate was rendered and handed to the mailer.
    pub success: bool,
    /// Human-readable summary, or the first failure encountered.
    pub message: String,
}

impl ProcessResult {
    /// Successful issuance.
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Failed issuance.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
