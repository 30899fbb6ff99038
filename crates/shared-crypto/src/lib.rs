//! # Shared Crypto - Envelope Protocol Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `symmetric` | AES-GCM | JWE content layer |
//! | `rsa_keys` | RSA-OAEP-256, RSASSA-PSS | Key wrap, signatures |
//! | `jose` | Compact JWE / JWS | Gateway envelope format |
//!
//! ## Security Properties
//!
//! - **Algorithm pinning**: only `RSA-OAEP-256`, `A128GCM`/`A256GCM` and `PS256`
//!   are accepted; the header cannot downgrade the protocol
//! - **RSA >= 2048 bits** enforced at key import
//! - Content keys are zeroized on drop

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod jose;
pub mod rsa_keys;
pub mod symmetric;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-exports
pub use errors::CryptoError;
pub use jose::{decrypt_compact, encrypt_compact, seal, sign_compact, verify_compact};
pub use rsa_keys::{
    DecryptionKey, EncryptionKey, SigningKey, VerificationKey, KEY_MANAGEMENT_ALG, MIN_RSA_BITS,
    SIGNATURE_ALG,
};
pub use symmetric::ContentEncryption;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
