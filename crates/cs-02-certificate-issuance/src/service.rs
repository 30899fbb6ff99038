//! # Certificate Issuance Service
//!
//! Application service implementing `CertificateIssuanceApi`.
//!
//! ```text
//! payload ──→ validate ──→ claim ──→ render (blocking pool) ──→ dispatch (bounded, timed)
//!                 │          │             │                        │
//!                 ↓          ↓             ↓                        ↓
//!           Validation   Duplicate       Render                 Delivery
//! ```
//!
//! One attempt per event. A failed render or dispatch releases the
//! redelivery claim so a later delivery of the same event can try again.

use crate::adapters::redelivery::AcceptAll;
use crate::domain::entities::{
    Certificate, CertificateEmail, DeliveryReceipt, VoterRecord, ISSUED_MESSAGE,
};
use crate::domain::errors::{DeliveryError, IssuanceError, RenderError};
use crate::domain::validation::validate;
use crate::ports::inbound::CertificateIssuanceApi;
use crate::ports::outbound::{
    CertificateMailer, CertificateRenderer, RedeliveryGuard, SystemTimeSource, TimeSource,
};
use async_trait::async_trait;
use chrono::{FixedOffset, Offset, Utc};
use shared_types::{ProcessResult, VoteConfirmationPayload};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Default cap on concurrent sends.
pub const DEFAULT_MAX_CONCURRENT_DISPATCH: usize = 16;

/// Default per-send timeout.
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default issuance offset: UTC-5 (America/Guayaquil, no DST).
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = -5;

/// Issuance tuning.
#[derive(Debug, Clone, Copy)]
pub struct IssuanceConfig {
    pub max_concurrent_dispatch: usize,
    pub dispatch_timeout: Duration,
    pub utc_offset: FixedOffset,
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self {
            max_concurrent_dispatch: DEFAULT_MAX_CONCURRENT_DISPATCH,
            dispatch_timeout: DEFAULT_DISPATCH_TIMEOUT,
            utc_offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_HOURS * 3600)
                .unwrap_or(Utc.fix()),
        }
    }
}

/// Certificate issuance service.
pub struct IssuanceService<R: CertificateRenderer, M: CertificateMailer> {
    renderer: Arc<R>,
    mailer: M,
    redelivery: Box<dyn RedeliveryGuard>,
    clock: Box<dyn TimeSource>,
    dispatch_slots: Arc<Semaphore>,
    dispatch_timeout: Duration,
}

impl<R: CertificateRenderer, M: CertificateMailer> IssuanceService<R, M> {
    /// Create a service that issues on every delivery.
    ///
    /// # Arguments
    /// * `renderer` - Produces the certificate document
    /// * `mailer` - Delivers it
    /// * `config` - Concurrency cap, send timeout and issuance offset
    pub fn new(renderer: R, mailer: M, config: IssuanceConfig) -> Self {
        Self {
            renderer: Arc::new(renderer),
            mailer,
            redelivery: Box::new(AcceptAll),
            clock: Box::new(SystemTimeSource::new(config.utc_offset)),
            dispatch_slots: Arc::new(Semaphore::new(config.max_concurrent_dispatch.max(1))),
            dispatch_timeout: config.dispatch_timeout,
        }
    }

    /// Replace the redelivery guard.
    pub fn with_redelivery_guard(mut self, guard: impl RedeliveryGuard + 'static) -> Self {
        self.redelivery = Box::new(guard);
        self
    }

    /// Replace the time source.
    pub fn with_time_source(mut self, clock: impl TimeSource + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Run the pipeline and return the first failure, if any.
    pub async fn try_issue(
        &self,
        payload: &VoteConfirmationPayload,
    ) -> Result<DeliveryReceipt, IssuanceError> {
        let record = validate(payload).inspect_err(|e| {
            warn!(cedula = %payload.cedula, missing = ?e.missing, "Incomplete voter data");
        })?;

        let claim = self.redelivery.claim(&record)?;

        let result = self.render_and_dispatch(&record).await;
        if result.is_err() {
            self.redelivery.release(&claim);
        }
        result
    }

    async fn render_and_dispatch(
        &self,
        record: &VoterRecord,
    ) -> Result<DeliveryReceipt, IssuanceError> {
        info!(cedula = %record.cedula, "Issuing voting certificate");

        let pdf = self.render(record).await?;
        let email = CertificateEmail::new(record, pdf);
        let receipt = self.dispatch(email).await?;

        info!(cedula = %record.cedula, to = %record.email, id = ?receipt.id, "Certificate sent");
        Ok(receipt)
    }

    async fn render(&self, record: &VoterRecord) -> Result<Vec<u8>, RenderError> {
        // Timestamp is captured here, at render time.
        let certificate = Certificate::new(record, self.clock.now());
        let renderer = Arc::clone(&self.renderer);

        tokio::task::spawn_blocking(move || renderer.render(&certificate))
            .await
            .map_err(|e| {
                error!(error = %e, "Render task aborted");
                RenderError::Aborted
            })?
    }

    async fn dispatch(&self, email: CertificateEmail) -> Result<DeliveryReceipt, DeliveryError> {
        let _permit = self
            .dispatch_slots
            .acquire()
            .await
            .map_err(|_| DeliveryError::Unavailable)?;

        match tokio::time::timeout(self.dispatch_timeout, self.mailer.send(email)).await {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::Timeout {
                after: self.dispatch_timeout,
            }),
        }
    }
}

#[async_trait]
impl<R: CertificateRenderer, M: CertificateMailer> CertificateIssuanceApi
    for IssuanceService<R, M>
{
    async fn issue(&self, payload: VoteConfirmationPayload) -> ProcessResult {
        match self.try_issue(&payload).await {
            Ok(_) => ProcessResult::succeeded(ISSUED_MESSAGE),
            Err(e) => {
                error!(cedula = %payload.cedula, error = %e, "Certificate issuance failed");
                ProcessResult::failed(e.to_string())
            }
        }
    }
}
