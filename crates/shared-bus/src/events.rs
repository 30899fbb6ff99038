//! # Service Events
//!
//! Notifications fanned out on the bus. Inbound work does not travel here;
//! it goes through the intake queue, which never drops.

use serde::{Deserialize, Serialize};
use shared_types::ProcessResult;
use uuid::Uuid;

/// The pipeline finished processing one event, successfully or not.
/// Source: vote confirmed handler | Target: observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateProcessed {
    /// Correlation id of the originating `VoteConfirmed` event.
    pub correlation_id: Uuid,
    /// National id, when the envelope was opened far enough to know it.
    pub cedula: Option<String>,
    /// Outcome reported to the caller.
    pub result: ProcessResult,
}

/// Filter for subscribing to specific outcomes.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventFilter {
    /// Only outcomes with this correlation id (None = any).
    pub correlation_id: Option<Uuid>,
}

impl EventFilter {
    /// Accept every outcome.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Accept only the outcome of one inbound event.
    #[must_use]
    pub fn outcome_of(correlation_id: Uuid) -> Self {
        Self {
            correlation_id: Some(correlation_id),
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &CertificateProcessed) -> bool {
        self.correlation_id
            .map_or(true, |id| id == event.correlation_id)
    }
}
