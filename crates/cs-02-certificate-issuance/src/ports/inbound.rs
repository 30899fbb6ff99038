//! # Inbound Port - CertificateIssuanceApi
//!
//! Driving port used by the event entry point once an envelope is open.

use async_trait::async_trait;
use shared_types::{ProcessResult, VoteConfirmationPayload};

/// Issue one voting certificate.
#[async_trait]
pub trait CertificateIssuanceApi: Send + Sync {
    /// Validate, render and dispatch.
    ///
    /// Never fails and never panics: every outcome is a `ProcessResult`,
    /// `success` only when the certificate was rendered and handed to the
    /// mail provider.
    async fn issue(&self, payload: VoteConfirmationPayload) -> ProcessResult;
}
