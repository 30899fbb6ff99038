//! # RSA Key Material
//!
//! Typed wrappers around RSA keys, one per protocol role:
//!
//! | Type | Role | Algorithm |
//! |------|------|-----------|
//! | `DecryptionKey` | unwrap the JWE content key | RSA-OAEP-256 |
//! | `VerificationKey` | check the JWS signature | PS256 |
//! | `EncryptionKey` | wrap a content key (sealing side) | RSA-OAEP-256 |
//! | `SigningKey` | produce the JWS signature (sealing side) | PS256 |
//!
//! Private keys are imported from PKCS#8 PEM, public keys from SPKI PEM.
//! Keys whose modulus is below 2048 bits are rejected at import.

use crate::CryptoError;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, Pss, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

/// Smallest RSA modulus accepted for either algorithm.
pub const MIN_RSA_BITS: usize = 2048;

/// JWE key management algorithm identifier.
pub const KEY_MANAGEMENT_ALG: &str = "RSA-OAEP-256";

/// JWS signature algorithm identifier.
pub const SIGNATURE_ALG: &str = "PS256";

fn check_modulus<K: PublicKeyParts>(key: &K) -> Result<(), CryptoError> {
    let bits = key.size() * 8;
    if bits < MIN_RSA_BITS {
        return Err(CryptoError::KeyTooSmall {
            bits,
            minimum: MIN_RSA_BITS,
        });
    }
    Ok(())
}

/// Private key used to unwrap content keys (RSA-OAEP with SHA-256).
#[derive(Clone)]
pub struct DecryptionKey(RsaPrivateKey);

impl DecryptionKey {
    /// Import from a PKCS#8 PEM document.
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self, CryptoError> {
        let key = RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        check_modulus(&key)?;
        Ok(Self(key))
    }

    /// Wrap an in-memory key.
    pub fn from_rsa(key: RsaPrivateKey) -> Result<Self, CryptoError> {
        check_modulus(&key)?;
        Ok(Self(key))
    }

    /// Unwrap an RSA-OAEP-256 encrypted key.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.0
            .decrypt(Oaep::new::<Sha256>(), ciphertext)
            .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
    }

    /// The matching public half, for sealing towards this key.
    pub fn encryption_key(&self) -> EncryptionKey {
        EncryptionKey(self.0.to_public_key())
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.0.size() * 8
    }
}

impl std::fmt::Debug for DecryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptionKey")
            .field("bits", &self.bits())
            .finish_non_exhaustive()
    }
}

/// Public key used to check PS256 signatures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationKey(RsaPublicKey);

impl VerificationKey {
    /// Import from an SPKI PEM document.
    pub fn from_public_key_pem(pem: &str) -> Result<Self, CryptoError> {
        let key = RsaPublicKey::from_public_key_pem(pem)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        check_modulus(&key)?;
        Ok(Self(key))
    }

    /// Wrap an in-memory key.
    pub fn from_rsa(key: RsaPublicKey) -> Result<Self, CryptoError> {
        check_modulus(&key)?;
        Ok(Self(key))
    }

    /// Verify an RSASSA-PSS (SHA-256, 32-byte salt) signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let digest = Sha256::digest(message);
        self.0
            .verify(Pss::new::<Sha256>(), &digest, signature)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }

    /// Export as SPKI PEM.
    pub fn to_public_key_pem(&self) -> Result<String, CryptoError> {
        self.0
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.0.size() * 8
    }
}

/// Public key used to wrap content keys for a recipient.
#[derive(Clone, Debug)]
pub struct EncryptionKey(RsaPublicKey);

impl EncryptionKey {
    /// Import from an SPKI PEM document.
    pub fn from_public_key_pem(pem: &str) -> Result<Self, CryptoError> {
        let key = RsaPublicKey::from_public_key_pem(pem)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        check_modulus(&key)?;
        Ok(Self(key))
    }

    /// Wrap a content key with RSA-OAEP-256.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.0
            .encrypt(&mut rand::thread_rng(), Oaep::new::<Sha256>(), plaintext)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
    }
}

/// Private key used to produce PS256 signatures.
#[derive(Clone)]
pub struct SigningKey(RsaPrivateKey);

impl SigningKey {
    /// Import from a PKCS#8 PEM document.
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self, CryptoError> {
        let key = RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        check_modulus(&key)?;
        Ok(Self(key))
    }

    /// Wrap an in-memory key.
    pub fn from_rsa(key: RsaPrivateKey) -> Result<Self, CryptoError> {
        check_modulus(&key)?;
        Ok(Self(key))
    }

    /// Sign `message` with RSASSA-PSS (SHA-256, 32-byte salt).
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let digest = Sha256::digest(message);
        self.0
            .sign_with_rng(&mut rand::thread_rng(), Pss::new::<Sha256>(), &digest)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))
    }

    /// The matching public half.
    pub fn verification_key(&self) -> VerificationKey {
        VerificationKey(self.0.to_public_key())
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey").finish_non_exhaustive()
    }
}

/// Generate a fresh RSA key pair and return it as `(pkcs8_pem, spki_pem)`.
///
/// Provisioning is out of band in production; this exists for tests and
/// local fixtures.
pub fn generate_pem_pair(bits: usize) -> Result<(String, String), CryptoError> {
    let private = RsaPrivateKey::new(&mut rand::thread_rng(), bits)
        .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
    let private_pem = private
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
    let public_pem = private
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
    Ok((private_pem.to_string(), public_pem))
}
