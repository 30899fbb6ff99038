//! # Outbound Ports (Driven Ports / SPI)
//!
//! | Port | Default adapter |
//! |------|-----------------|
//! | `CertificateRenderer` | `adapters::pdf::PdfCertificateRenderer` |
//! | `CertificateMailer` | `adapters::resend::ResendMailer` |
//! | `RedeliveryGuard` | `adapters::redelivery::AcceptAll` |
//! | `TimeSource` | `SystemTimeSource` |

use crate::domain::entities::{
    Certificate, CertificateEmail, DeliveryReceipt, RedeliveryClaim, VoterRecord,
};
use crate::domain::errors::{DeliveryError, DuplicateDelivery, RenderError};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};

/// Turns certificate content into a document.
///
/// CPU-bound; the service calls it on the blocking pool.
pub trait CertificateRenderer: Send + Sync + 'static {
    /// Render `certificate` to PDF bytes.
    fn render(&self, certificate: &Certificate) -> Result<Vec<u8>, RenderError>;
}

/// Hands an email to the delivery provider.
#[async_trait]
pub trait CertificateMailer: Send + Sync {
    /// Send `email`. One attempt, no retries.
    ///
    /// # Errors
    /// * `DeliveryError::Provider` - the provider rejected the message
    /// * `DeliveryError::Transport` - the provider could not be reached
    async fn send(&self, email: CertificateEmail) -> Result<DeliveryReceipt, DeliveryError>;
}

/// Suppresses repeated issuance for the same voter.
pub trait RedeliveryGuard: Send + Sync {
    /// Claim the right to issue for `record`.
    fn claim(&self, record: &VoterRecord) -> Result<RedeliveryClaim, DuplicateDelivery>;

    /// Give `claim` back after a failed issuance.
    fn release(&self, claim: &RedeliveryClaim);
}

/// Time source for the issuance timestamp.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Current time in the issuing authority's offset.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// System clock shifted to a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    offset: FixedOffset,
}

impl SystemTimeSource {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

/// Fixed time source for testing.
#[cfg(test)]
pub struct MockTimeSource(pub DateTime<FixedOffset>);

#[cfg(test)]
impl TimeSource for MockTimeSource {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
