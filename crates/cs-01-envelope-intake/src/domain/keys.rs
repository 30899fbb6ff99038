//! # Key Material
//!
//! The two keys the service needs, loaded once at startup:
//!
//! | Secret | Format | Role |
//! |--------|--------|------|
//! | `CERTIFICATE_PRIVATE_KEY_BASE64` | base64(PKCS#8 PEM) | unwrap the JWE content key (`RSA-OAEP-256`) |
//! | `CENSUS_PUBLIC_KEY_BASE64` | base64(SPKI PEM) | verify the gateway's JWS (`PS256`) |
//!
//! `KeyMaterial` is immutable once built. Share it with `Arc`.

use crate::domain::errors::KeyLoadError;
use base64::{engine::general_purpose::STANDARD, Engine};
use shared_crypto::{CryptoError, DecryptionKey, VerificationKey};
use std::fmt;

/// Identifies one of the provisioned secrets in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySecret {
    /// The service's own private key.
    ServicePrivateKey,
    /// The census gateway's public key.
    GatewayPublicKey,
}

impl KeySecret {
    /// Environment variable the secret is provisioned in.
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::ServicePrivateKey => "CERTIFICATE_PRIVATE_KEY_BASE64",
            Self::GatewayPublicKey => "CENSUS_PUBLIC_KEY_BASE64",
        }
    }
}

impl fmt::Display for KeySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.env_var())
    }
}

/// Decryption key and verification key, validated and ready for use.
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    decrypt: DecryptionKey,
    verify: VerificationKey,
}

impl KeyMaterial {
    /// Load both keys from their base64-wrapped PEM secrets.
    ///
    /// Fails on the first missing or unusable secret. The service must not
    /// accept events until this has succeeded.
    pub fn load(
        private_key_b64: Option<&str>,
        public_key_b64: Option<&str>,
    ) -> Result<Self, KeyLoadError> {
        let private_pem = decode_secret(KeySecret::ServicePrivateKey, private_key_b64)?;
        let decrypt = DecryptionKey::from_pkcs8_pem(&private_pem)
            .map_err(|e| invalid_key(KeySecret::ServicePrivateKey, e))?;

        let public_pem = decode_secret(KeySecret::GatewayPublicKey, public_key_b64)?;
        let verify = VerificationKey::from_public_key_pem(&public_pem)
            .map_err(|e| invalid_key(KeySecret::GatewayPublicKey, e))?;

        Ok(Self { decrypt, verify })
    }

    /// Build from already-imported keys.
    pub fn from_keys(decrypt: DecryptionKey, verify: VerificationKey) -> Self {
        Self { decrypt, verify }
    }

    /// Key for `RSA-OAEP-256` content key unwrapping.
    pub fn decrypt_key(&self) -> &DecryptionKey {
        &self.decrypt
    }

    /// Key for `PS256` signature verification.
    pub fn verify_key(&self) -> &VerificationKey {
        &self.verify
    }
}

fn decode_secret(secret: KeySecret, value: Option<&str>) -> Result<String, KeyLoadError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(KeyLoadError::Missing { secret })?;

    let bytes = STANDARD
        .decode(value)
        .map_err(|_| KeyLoadError::InvalidBase64 { secret })?;

    String::from_utf8(bytes).map_err(|_| KeyLoadError::InvalidKey {
        secret,
        reason: "decoded secret is not UTF-8 PEM text".to_string(),
    })
}

fn invalid_key(secret: KeySecret, err: CryptoError) -> KeyLoadError {
    KeyLoadError::InvalidKey {
        secret,
        reason: err.to_string(),
    }
}
