//! # Shared Fixtures
//!
//! Sealing mirrors the gateway: sign with the gateway's private key, then
//! encrypt to the certificate service's public key.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use cs_01_envelope_intake::{EnvelopeIntakeService, EnvelopeUnpacker, KeyMaterial};
use cs_02_certificate_issuance::{
    CertificateEmail, CertificateMailer, DeliveryError, DeliveryReceipt, IssuanceConfig,
    IssuanceService, PdfCertificateRenderer,
};
use shared_crypto::test_utils::{gateway_pair, service_pair, to_env_secret, unrelated_pair};
use shared_crypto::{seal, DecryptionKey, EncryptionKey, SigningKey};
use shared_types::{EventHeaders, VoteConfirmationPayload};

/// Credential shared by gateway and service in these tests.
pub const INTERNAL_API_KEY: &str = "sevotec-internal-test-key";

/// The reference voter.
pub fn ana() -> VoteConfirmationPayload {
    VoteConfirmationPayload {
        nombres: "Ana Paredes".to_string(),
        cedula: "0102030405".to_string(),
        email: "ana@example.com".to_string(),
        recinto: Some("Unidad Educativa Central".to_string()),
    }
}

/// Service key material loaded the way the runtime loads it.
pub fn service_keys() -> KeyMaterial {
    let (service_private, _) = service_pair();
    let (_, gateway_public) = gateway_pair();
    KeyMaterial::load(
        Some(&to_env_secret(service_private)),
        Some(&to_env_secret(gateway_public)),
    )
    .unwrap()
}

pub fn gateway_signer() -> SigningKey {
    SigningKey::from_pkcs8_pem(gateway_pair().0).unwrap()
}

pub fn unrelated_signer() -> SigningKey {
    SigningKey::from_pkcs8_pem(unrelated_pair().0).unwrap()
}

/// Public half of the service key, as the gateway holds it.
pub fn service_recipient() -> EncryptionKey {
    DecryptionKey::from_pkcs8_pem(service_pair().0)
        .unwrap()
        .encryption_key()
}

pub fn unrelated_recipient() -> EncryptionKey {
    DecryptionKey::from_pkcs8_pem(unrelated_pair().0)
        .unwrap()
        .encryption_key()
}

/// Seal `payload` exactly as the gateway does.
pub fn seal_payload(payload: &VoteConfirmationPayload) -> String {
    let json = serde_json::to_vec(payload).unwrap();
    seal(&gateway_signer(), &service_recipient(), &json).unwrap()
}

/// Headers carrying the right credential and `envelope`.
pub fn headers(envelope: impl Into<String>) -> EventHeaders {
    EventHeaders {
        api_key: Some(INTERNAL_API_KEY.to_string()),
        security_envelope: Some(envelope.into()),
    }
}

/// The real intake subsystem over the fixture keys.
pub fn intake_service() -> EnvelopeIntakeService<EnvelopeUnpacker> {
    EnvelopeIntakeService::new(
        EnvelopeUnpacker::new(Arc::new(service_keys())),
        Some(INTERNAL_API_KEY.to_string()),
    )
}

/// The real issuance subsystem with `mailer` in place of the provider.
pub fn issuance_service<M: CertificateMailer>(
    mailer: M,
) -> IssuanceService<PdfCertificateRenderer, M> {
    IssuanceService::new(PdfCertificateRenderer::new(), mailer, IssuanceConfig::default())
}

// =============================================================================
// Mailers
// =============================================================================

/// Mailer that records every email it accepts.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<CertificateEmail>>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<CertificateEmail> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl CertificateMailer for RecordingMailer {
    async fn send(&self, email: CertificateEmail) -> Result<DeliveryReceipt, DeliveryError> {
        self.sent.lock().push(email);
        Ok(DeliveryReceipt {
            id: Some(format!("test-{}", self.sent.lock().len())),
        })
    }
}

/// Mailer whose provider rejects everything.
#[derive(Clone, Default)]
pub struct FailingMailer {
    pub attempts: Arc<Mutex<usize>>,
}

#[async_trait]
impl CertificateMailer for FailingMailer {
    async fn send(&self, _email: CertificateEmail) -> Result<DeliveryReceipt, DeliveryError> {
        *self.attempts.lock() += 1;
        Err(DeliveryError::Provider {
            status: 403,
            message: "The sending domain is not verified".to_string(),
        })
    }
}
