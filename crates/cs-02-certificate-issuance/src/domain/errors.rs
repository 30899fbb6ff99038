//! # Issuance Errors
//!
//! Each variant's `Display` is what a failed `ProcessResult` carries.

use std::time::Duration;
use thiserror::Error;

/// Required voter fields were missing or blank.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Datos incompletos: nombres, cédula y email son requeridos")]
pub struct ValidationError {
    /// Names of the offending fields, for logs.
    pub missing: Vec<&'static str>,
}

/// The certificate document could not be produced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("Error generando certificado: {0}")]
    Document(String),

    /// The rendering task panicked or was cancelled.
    #[error("Error generando certificado: tarea de renderizado abortada")]
    Aborted,
}

/// The email could not be handed to the provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// Provider answered with an error.
    #[error("Error del servicio de email: {message}")]
    Provider { status: u16, message: String },

    /// Provider could not be reached.
    #[error("{0}")]
    Transport(String),

    /// Send exceeded the dispatch timeout.
    #[error("tiempo de espera agotado tras {after:?}")]
    Timeout { after: Duration },

    /// No provider credentials configured.
    #[error("proveedor de email no configurado")]
    NotConfigured,

    /// Dispatch slot could not be acquired.
    #[error("despacho no disponible")]
    Unavailable,
}

/// A certificate for this voter was already issued inside the redelivery window.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Certificado ya emitido recientemente para esta cédula")]
pub struct DuplicateDelivery;

/// First failure of one issuance run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IssuanceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Error enviando certificado: {0}")]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Duplicate(#[from] DuplicateDelivery),
}
