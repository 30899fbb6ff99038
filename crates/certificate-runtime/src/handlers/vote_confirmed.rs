//! # Vote Confirmed Handler
//!
//! Entry point of the pipeline. One run per `VoteConfirmed` event:
//!
//! ```text
//! Received → AuthorizationChecked → EnvelopeUnpacked → Validated
//!          → Rendered → Dispatched → Reported
//! ```
//!
//! Any failing step short-circuits to `Reported` with a failed
//! `ProcessResult`. Validation, rendering and dispatch happen inside
//! `CertificateIssuanceApi`; this handler owns the first three steps and the
//! report. No state is kept between events.

use std::fmt;
use std::sync::Arc;

use cs_01_envelope_intake::{EnvelopeIntakeApi, IntakeError};
use cs_02_certificate_issuance::CertificateIssuanceApi;
use shared_bus::{CertificateProcessed, EventPublisher, IntakeDelivery, IntakeReceiver};
use shared_types::{ProcessResult, VoteConfirmedEvent};
use tracing::{debug, error, info, warn};

/// Reported when a step fails in a way no error type covers.
pub const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servicio";

/// Steps of one pipeline run, as they appear in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    Received,
    AuthorizationChecked,
    EnvelopeUnpacked,
    Validated,
    Rendered,
    Dispatched,
    Reported,
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::AuthorizationChecked => "authorization_checked",
            Self::EnvelopeUnpacked => "envelope_unpacked",
            Self::Validated => "validated",
            Self::Rendered => "rendered",
            Self::Dispatched => "dispatched",
            Self::Reported => "reported",
        };
        f.write_str(name)
    }
}

/// Result of one run, with the national id when the envelope was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOutcome {
    pub cedula: Option<String>,
    pub result: ProcessResult,
}

/// Handler for `VoteConfirmed` events.
pub struct VoteConfirmedHandler {
    intake: Arc<dyn EnvelopeIntakeApi>,
    issuance: Arc<dyn CertificateIssuanceApi>,
}

impl VoteConfirmedHandler {
    /// Create a new handler.
    pub fn new(
        intake: Arc<dyn EnvelopeIntakeApi>,
        issuance: Arc<dyn CertificateIssuanceApi>,
    ) -> Self {
        Self { intake, issuance }
    }

    /// Process one event. Never fails and never panics.
    pub async fn handle(&self, event: &VoteConfirmedEvent) -> EventOutcome {
        let correlation_id = event.correlation_id;
        debug!(%correlation_id, stage = %ProcessingStage::Received, "Vote confirmation received");

        // RSA work stays off the async workers.
        let intake = Arc::clone(&self.intake);
        let headers = event.headers.clone();
        let opened = match tokio::task::spawn_blocking(move || intake.open(&headers)).await {
            Ok(opened) => opened,
            Err(e) => {
                error!(%correlation_id, error = %e, "Envelope intake task aborted");
                return report(correlation_id, None, ProcessResult::failed(INTERNAL_ERROR_MESSAGE));
            }
        };

        let payload = match opened {
            Ok(payload) => payload,
            Err(e) => {
                let stage = failed_stage(&e);
                warn!(%correlation_id, %stage, error = %e, "Vote confirmation rejected");
                return report(correlation_id, None, ProcessResult::failed(e.to_string()));
            }
        };

        let cedula = payload.cedula.clone();
        info!(
            %correlation_id,
            %cedula,
            stage = %ProcessingStage::EnvelopeUnpacked,
            "Processing vote.confirmed"
        );

        // Isolated in its own task so a panic in an adapter becomes a report.
        let issuance = Arc::clone(&self.issuance);
        let result = match tokio::spawn(async move { issuance.issue(payload).await }).await {
            Ok(result) => result,
            Err(e) => {
                error!(%correlation_id, %cedula, error = %e, "Certificate issuance task aborted");
                ProcessResult::failed(INTERNAL_ERROR_MESSAGE)
            }
        };

        report(correlation_id, Some(cedula), result)
    }

    /// Drain the intake queue until every sender is gone.
    ///
    /// Every event is processed in its own task. The outcome goes back on the
    /// delivery's reply channel, if it has one, and is published as
    /// `CertificateProcessed`.
    pub async fn run(self: Arc<Self>, mut intake: IntakeReceiver, bus: Arc<dyn EventPublisher>) {
        info!("Vote confirmed handler started");

        while let Some(IntakeDelivery { event, reply }) = intake.recv().await {
            let handler = Arc::clone(&self);
            let bus = Arc::clone(&bus);
            tokio::spawn(async move {
                let outcome = handler.handle(&event).await;
                let correlation_id = event.correlation_id;

                if let Some(reply) = reply {
                    if reply.send(outcome.result.clone()).is_err() {
                        debug!(%correlation_id, "Requester gone before the outcome");
                    }
                }

                bus.publish(CertificateProcessed {
                    correlation_id,
                    cedula: outcome.cedula,
                    result: outcome.result,
                })
                .await;
            });
        }

        info!("Intake queue closed, vote confirmed handler stopping");
    }
}

fn failed_stage(error: &IntakeError) -> ProcessingStage {
    match error {
        IntakeError::Unauthorized(_) => ProcessingStage::AuthorizationChecked,
        IntakeError::MissingEnvelope | IntakeError::InvalidEnvelope(_) => {
            ProcessingStage::EnvelopeUnpacked
        }
    }
}

fn report(
    correlation_id: uuid::Uuid,
    cedula: Option<String>,
    result: ProcessResult,
) -> EventOutcome {
    let cedula_field = cedula.as_deref().unwrap_or("-");
    if result.success {
        info!(
            %correlation_id,
            cedula = cedula_field,
            stage = %ProcessingStage::Reported,
            "Certificate processed successfully"
        );
    } else {
        warn!(
            %correlation_id,
            cedula = cedula_field,
            stage = %ProcessingStage::Reported,
            message = %result.message,
            "Certificate processing failed"
        );
    }
    EventOutcome { cedula, result }
}
