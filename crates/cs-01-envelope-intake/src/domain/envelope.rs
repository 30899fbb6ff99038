//! # Envelope Unpacker
//!
//! Opens the gateway's two-layer envelope:
//!
//! ```text
//! JWE (RSA-OAEP-256, A256GCM | A128GCM)
//!  └── JWS (PS256)
//!       └── JSON { nombres, cedula, email, recinto? }
//! ```
//!
//! Decrypt first, then verify, then parse. The outer layer hides who sent
//! the event; the inner layer proves it was the gateway.

use crate::domain::errors::EnvelopeError;
use crate::domain::keys::KeyMaterial;
use shared_crypto::jose;
use shared_types::VoteConfirmationPayload;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// The stage at which an unpack failed. Logged only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnpackStage {
    Decrypt,
    Verify,
    Parse,
}

impl fmt::Display for UnpackStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Decrypt => "decrypt",
            Self::Verify => "verify",
            Self::Parse => "parse",
        };
        f.write_str(name)
    }
}

/// Opens envelopes with a shared, read-only [`KeyMaterial`].
#[derive(Debug, Clone)]
pub struct EnvelopeUnpacker {
    keys: Arc<KeyMaterial>,
}

impl EnvelopeUnpacker {
    pub fn new(keys: Arc<KeyMaterial>) -> Self {
        Self { keys }
    }

    /// Decrypt, verify and parse one envelope.
    ///
    /// # Errors
    ///
    /// `EnvelopeError` for any failure. No partial payload is ever returned.
    pub fn unpack(&self, envelope: &str) -> Result<VoteConfirmationPayload, EnvelopeError> {
        let jws = jose::decrypt_compact(self.keys.decrypt_key(), envelope)
            .map_err(|e| reject(UnpackStage::Decrypt, &e))?;

        let jws = std::str::from_utf8(&jws).map_err(|e| reject(UnpackStage::Verify, &e))?;

        let payload = jose::verify_compact(self.keys.verify_key(), jws)
            .map_err(|e| reject(UnpackStage::Verify, &e))?;

        let payload: VoteConfirmationPayload =
            serde_json::from_slice(&payload).map_err(|e| reject(UnpackStage::Parse, &e))?;

        debug!(cedula = %payload.cedula, "Envelope opened");
        Ok(payload)
    }
}

fn reject(stage: UnpackStage, cause: &dyn fmt::Display) -> EnvelopeError {
    warn!(stage = %stage, cause = %cause, "Security envelope rejected");
    EnvelopeError
}
