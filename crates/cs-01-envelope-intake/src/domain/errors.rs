//! # Intake Errors
//!
//! `KeyLoadError` is fatal and only raised at startup. The others are raised
//! per event and end up as the message of a failed `ProcessResult`, so their
//! `Display` text is what the caller sees.

use crate::domain::keys::KeySecret;
use thiserror::Error;

/// Startup failure while loading key material.
///
/// Names the secret that failed, never its content.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyLoadError {
    /// The secret is not set or is empty.
    #[error("Required secret not found: {secret}")]
    Missing { secret: KeySecret },

    /// The secret is not valid base64.
    #[error("Secret {secret} is not valid base64")]
    InvalidBase64 { secret: KeySecret },

    /// The decoded secret is not a usable key.
    #[error("Secret {secret} does not hold a usable key: {reason}")]
    InvalidKey { secret: KeySecret, reason: String },
}

/// The credential check rejected the event.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    /// No credential, or an empty one.
    #[error("Acceso denegado: API Key requerida")]
    Missing,

    /// Credential does not match, or no expected credential is configured.
    #[error("Acceso denegado: API Key inválida")]
    Invalid,
}

/// The envelope could not be opened.
///
/// Deliberately carries no detail: decrypt, verify and parse failures are
/// indistinguishable to the caller.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Sobre de seguridad inválido, corrupto o sistema de llaves comprometido")]
pub struct EnvelopeError;

/// Everything that can stop an event at the intake stage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error(transparent)]
    Unauthorized(#[from] AuthorizationError),

    /// The event carried no envelope header.
    #[error("Falta sobre de seguridad requerido (x-security-envelope)")]
    MissingEnvelope,

    #[error(transparent)]
    InvalidEnvelope(#[from] EnvelopeError),
}

impl IntakeError {
    /// True for both a missing and an unopenable envelope.
    pub fn is_envelope_error(&self) -> bool {
        matches!(self, Self::MissingEnvelope | Self::InvalidEnvelope(_))
    }
}
