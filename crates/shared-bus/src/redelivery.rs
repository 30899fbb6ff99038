//! # Redelivery Window
//!
//! Sliding-window claim table used to suppress duplicate work when the same
//! event is delivered more than once.
//!
//! - A key may be claimed once per `window_secs`, measured from the claim
//! - A claim is released by presenting the stamp it was granted with, so a
//!   late release can never drop a newer claim on the same key
//! - Expired claims are garbage-collected on a fixed interval, which bounds
//!   memory by the event rate times the window length

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors from redelivery window operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RedeliveryError {
    /// The key is held by a claim younger than the window.
    #[error("Key {key} already claimed at {claimed_at} (window {window_secs}s)")]
    AlreadyClaimed {
        key: String,
        claimed_at: u64,
        window_secs: u64,
    },
}

/// Sliding-window claim table.
pub struct RedeliveryWindow {
    /// Map of key -> timestamp of the claim.
    claims: HashMap<String, u64>,

    /// How long a claim blocks the same key, in seconds.
    window_secs: u64,

    /// Last garbage collection timestamp.
    last_gc: u64,

    /// Garbage collection interval in seconds.
    gc_interval_secs: u64,
}

impl RedeliveryWindow {
    /// Default garbage collection interval.
    pub const DEFAULT_GC_INTERVAL: u64 = 10;

    /// Create a window of `window_secs` seconds.
    #[must_use]
    pub fn new(window_secs: u64) -> Self {
        Self::with_config(window_secs, Self::DEFAULT_GC_INTERVAL)
    }

    /// Create a window with a custom garbage collection interval.
    #[must_use]
    pub fn with_config(window_secs: u64, gc_interval_secs: u64) -> Self {
        Self {
            claims: HashMap::new(),
            window_secs,
            last_gc: Self::current_timestamp(),
            gc_interval_secs,
        }
    }

    /// Claim `key` as of `now` (unix seconds).
    ///
    /// Returns the claim stamp to hand back to [`release`](Self::release).
    ///
    /// # Errors
    ///
    /// `RedeliveryError::AlreadyClaimed` if the key was claimed less than
    /// `window_secs` before `now`.
    pub fn claim_at(&mut self, key: &str, now: u64) -> Result<u64, RedeliveryError> {
        if now.saturating_sub(self.last_gc) > self.gc_interval_secs {
            self.garbage_collect(now);
            self.last_gc = now;
        }

        if let Some(&claimed_at) = self.claims.get(key) {
            if now.saturating_sub(claimed_at) < self.window_secs {
                return Err(RedeliveryError::AlreadyClaimed {
                    key: key.to_string(),
                    claimed_at,
                    window_secs: self.window_secs,
                });
            }
        }

        self.claims.insert(key.to_string(), now);
        Ok(now)
    }

    /// Drop the claim on `key` granted at `claimed_at`.
    ///
    /// Returns `false` if the key is unclaimed or held by a different claim.
    pub fn release(&mut self, key: &str, claimed_at: u64) -> bool {
        match self.claims.get(key) {
            Some(&held) if held == claimed_at => {
                self.claims.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Number of claims held, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Check if no claims are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Remove expired claims.
    fn garbage_collect(&mut self, now: u64) {
        let window = self.window_secs;
        self.claims
            .retain(|_, &mut claimed_at| now.saturating_sub(claimed_at) < window);
    }

    /// Get current Unix timestamp.
    pub fn current_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
