//! # Redelivery Guards
//!
//! `AcceptAll` issues on every delivery. `WindowedRedeliveryGuard` keys each
//! voter by `SHA-256(cedula)` and lets one issuance through per sliding
//! window, backed by the bus crate's `RedeliveryWindow`.

use crate::domain::entities::{RedeliveryClaim, VoterRecord};
use crate::domain::errors::DuplicateDelivery;
use crate::ports::outbound::RedeliveryGuard;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use shared_bus::RedeliveryWindow;
use tracing::{debug, info};

/// Never suppresses anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl RedeliveryGuard for AcceptAll {
    fn claim(&self, _record: &VoterRecord) -> Result<RedeliveryClaim, DuplicateDelivery> {
        Ok(RedeliveryClaim::default())
    }

    fn release(&self, _claim: &RedeliveryClaim) {}
}

/// One issuance per voter per `window_secs`, measured from the last claim.
pub struct WindowedRedeliveryGuard {
    window: Mutex<RedeliveryWindow>,
}

impl WindowedRedeliveryGuard {
    /// Guard with a window of `window_secs` seconds (at least one).
    pub fn new(window_secs: u64) -> Self {
        Self {
            window: Mutex::new(RedeliveryWindow::new(window_secs.max(1))),
        }
    }

    /// Idempotency key for `cedula`. The raw national id is not kept.
    pub fn idempotency_key(cedula: &str) -> String {
        Sha256::digest(cedula.as_bytes())
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    fn claim_at(
        &self,
        record: &VoterRecord,
        now: u64,
    ) -> Result<RedeliveryClaim, DuplicateDelivery> {
        let key = Self::idempotency_key(&record.cedula);
        let mut window = self.window.lock();
        match window.claim_at(&key, now) {
            Ok(claimed_at) => {
                debug!(cedula = %record.cedula, held = window.len(), "Redelivery claim granted");
                Ok(RedeliveryClaim { key, claimed_at })
            }
            Err(e) => {
                info!(cedula = %record.cedula, error = %e, "Redelivered vote confirmation suppressed");
                Err(DuplicateDelivery)
            }
        }
    }
}

impl RedeliveryGuard for WindowedRedeliveryGuard {
    fn claim(&self, record: &VoterRecord) -> Result<RedeliveryClaim, DuplicateDelivery> {
        self.claim_at(record, RedeliveryWindow::current_timestamp())
    }

    fn release(&self, claim: &RedeliveryClaim) {
        if self.window.lock().release(&claim.key, claim.claimed_at) {
            debug!(claimed_at = claim.claimed_at, "Redelivery claim released");
        }
    }
}
