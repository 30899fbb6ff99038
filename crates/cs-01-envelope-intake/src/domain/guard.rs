//! # Access Guard
//!
//! Shared-secret check on every inbound event, run before the envelope is
//! touched.

use crate::domain::errors::AuthorizationError;
use subtle::ConstantTimeEq;
use tracing::warn;

/// Check the credential carried by an event against the configured one.
///
/// Rejects a missing or empty credential, a mismatch, and every credential
/// when no expected value is configured.
pub fn authorize(provided: Option<&str>, expected: &str) -> Result<(), AuthorizationError> {
    let provided = match provided {
        Some(value) if !value.is_empty() => value,
        _ => {
            warn!("Access attempt without API key");
            return Err(AuthorizationError::Missing);
        }
    };

    if expected.is_empty() {
        warn!("No internal API key configured; rejecting event");
        return Err(AuthorizationError::Invalid);
    }

    if !constant_time_compare(provided, expected) {
        warn!("Access attempt with invalid API key");
        return Err(AuthorizationError::Invalid);
    }

    Ok(())
}

/// Constant-time string comparison.
///
/// The length check is folded into the same constant-time result, so neither
/// the position of the first differing byte nor a length mismatch shows up
/// in timing.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    // Pad both to the longer length with different bytes so a length
    // mismatch can never compare equal.
    let max_len = std::cmp::max(a.len(), b.len());

    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];

    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);

    (lengths_equal & contents_equal).into()
}
