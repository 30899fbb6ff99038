//! # Service Container
//!
//! Holds the subsystem instances behind their inbound ports.
//!
//! ## Initialization Order
//!
//! ```text
//! 1. KeyMaterial       (fatal on failure, nothing else is built)
//! 2. Envelope Intake   (CS-01, owns the keys)
//! 3. Certificate Issuance (CS-02, renderer + mailer + redelivery guard)
//! 4. Outcome bus
//! ```
//!
//! ## Thread Safety
//!
//! - Subsystems are shared as `Arc<dyn ...>` and hold no mutable state
//!   besides the optional redelivery window, which locks internally

use std::sync::Arc;

use cs_01_envelope_intake::{
    EnvelopeIntakeApi, EnvelopeIntakeService, EnvelopeUnpacker, KeyLoadError, KeyMaterial,
};
use cs_02_certificate_issuance::{
    CertificateIssuanceApi, IssuanceService, PdfCertificateRenderer, ResendMailer,
    WindowedRedeliveryGuard,
};
use shared_bus::InMemoryEventBus;
use thiserror::Error;
use tracing::{info, warn};

use crate::container::config::{ConfigError, ServiceConfig};

/// Failure while building the container.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Keys(#[from] KeyLoadError),

    #[error("cannot build email client: {0}")]
    Mailer(String),
}

/// Central container holding all subsystem instances.
pub struct ServiceContainer {
    /// Envelope Intake (CS-01).
    pub intake: Arc<dyn EnvelopeIntakeApi>,

    /// Certificate Issuance (CS-02).
    pub issuance: Arc<dyn CertificateIssuanceApi>,

    /// Bus carrying `CertificateProcessed` notifications.
    pub event_bus: Arc<InMemoryEventBus>,
}

impl ServiceContainer {
    /// Build every subsystem from configuration.
    ///
    /// Fails before any subsystem exists if either key cannot be loaded.
    pub fn new(config: &ServiceConfig) -> Result<Self, ContainerError> {
        config.validate()?;

        let keys = KeyMaterial::load(
            config.security.private_key_base64.as_deref(),
            config.security.gateway_public_key_base64.as_deref(),
        )?;
        info!(
            decrypt_bits = keys.decrypt_key().bits(),
            verify_bits = keys.verify_key().bits(),
            "Key material loaded"
        );

        let intake = EnvelopeIntakeService::new(
            EnvelopeUnpacker::new(Arc::new(keys)),
            config.security.internal_api_key.clone(),
        );

        if config.mail.resend_api_key.is_none() {
            warn!("RESEND_API_KEY is not set; every certificate delivery will fail");
        }
        let mailer = ResendMailer::new(config.resend_config(), config.dispatch_timeout())
            .map_err(|e| ContainerError::Mailer(e.to_string()))?;

        let mut issuance = IssuanceService::new(
            PdfCertificateRenderer::new(),
            mailer,
            config.issuance_config()?,
        );
        let window = config.issuance.redelivery_window_secs;
        if window > 0 {
            info!(window_secs = window, "Redelivery suppression enabled");
            issuance = issuance.with_redelivery_guard(WindowedRedeliveryGuard::new(window));
        }

        Ok(Self::from_parts(Arc::new(intake), Arc::new(issuance)))
    }

    /// Assemble a container from prebuilt subsystems.
    pub fn from_parts(
        intake: Arc<dyn EnvelopeIntakeApi>,
        issuance: Arc<dyn CertificateIssuanceApi>,
    ) -> Self {
        Self {
            intake,
            issuance,
            event_bus: Arc::new(InMemoryEventBus::new()),
        }
    }
}
