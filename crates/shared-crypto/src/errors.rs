//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
///
/// These carry enough detail for operator logs. Callers that face untrusted
/// input collapse them into a single opaque error before anything leaves the
/// process.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Invalid nonce length
    #[error("Invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength {
        /// Expected nonce length in bytes
        expected: usize,
        /// Actual nonce length in bytes
        actual: usize,
    },

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Signing failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Invalid public key
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Invalid private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// RSA modulus below the protocol minimum
    #[error("RSA key too small: {bits} bits (minimum {minimum})")]
    KeyTooSmall {
        /// Modulus size of the offered key
        bits: usize,
        /// Minimum accepted modulus size
        minimum: usize,
    },

    /// Compact serialization is structurally invalid
    #[error("Malformed compact serialization: {0}")]
    MalformedCompact(String),

    /// Protected header names an algorithm this protocol does not accept
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Invalid input for cryptographic operation
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
