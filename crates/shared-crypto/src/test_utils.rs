//! Test utilities for the envelope protocol.
//!
//! RSA key generation is slow, so each role's key pair is generated once per
//! test binary and shared. Enable with the `test-utils` feature flag.

use crate::rsa_keys::generate_pem_pair;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::sync::OnceLock;

/// Modulus size used for fixture keys.
pub const FIXTURE_BITS: usize = 2048;

fn cached(cell: &'static OnceLock<(String, String)>) -> (&'static str, &'static str) {
    let (private_pem, public_pem) =
        cell.get_or_init(|| generate_pem_pair(FIXTURE_BITS).expect("fixture key generation"));
    (private_pem.as_str(), public_pem.as_str())
}

/// Key pair of the certificate service: `(pkcs8_pem, spki_pem)`.
pub fn service_pair() -> (&'static str, &'static str) {
    static CELL: OnceLock<(String, String)> = OnceLock::new();
    cached(&CELL)
}

/// Key pair of the census gateway: `(pkcs8_pem, spki_pem)`.
pub fn gateway_pair() -> (&'static str, &'static str) {
    static CELL: OnceLock<(String, String)> = OnceLock::new();
    cached(&CELL)
}

/// A key pair unrelated to either party.
pub fn unrelated_pair() -> (&'static str, &'static str) {
    static CELL: OnceLock<(String, String)> = OnceLock::new();
    cached(&CELL)
}

/// Base64-wrap a PEM document the way secrets are provisioned in the environment.
pub fn to_env_secret(pem: &str) -> String {
    STANDARD.encode(pem.as_bytes())
}
