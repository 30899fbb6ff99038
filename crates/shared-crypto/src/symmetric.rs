//! # Content Encryption
//!
//! AES-GCM authenticated encryption for the content layer of a JWE.
//!
//! ## Security Properties
//!
//! - **AES-GCM**: 96-bit IV, 128-bit tag, protected header bound as AAD
//! - Content keys are zeroized on drop

use crate::CryptoError;
use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes128Gcm, Aes256Gcm, Nonce,
};
use zeroize::Zeroize;

/// GCM IV length in bytes.
pub const IV_LEN: usize = 12;

/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Content encryption algorithm (`enc` header value).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ContentEncryption {
    /// AES-128-GCM
    A128Gcm,
    /// AES-256-GCM (what the gateway emits by default)
    #[default]
    A256Gcm,
}

impl ContentEncryption {
    /// Parse the `enc` header value.
    pub fn from_header(value: &str) -> Result<Self, CryptoError> {
        match value {
            "A128GCM" => Ok(Self::A128Gcm),
            "A256GCM" => Ok(Self::A256Gcm),
            other => Err(CryptoError::UnsupportedAlgorithm(other.to_string())),
        }
    }

    /// The `enc` header value.
    pub fn header_name(&self) -> &'static str {
        match self {
            Self::A128Gcm => "A128GCM",
            Self::A256Gcm => "A256GCM",
        }
    }

    /// Content key length in bytes.
    pub fn key_len(&self) -> usize {
        match self {
            Self::A128Gcm => 16,
            Self::A256Gcm => 32,
        }
    }
}

/// Content encryption key (CEK).
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct ContentKey(Vec<u8>);

impl ContentKey {
    /// Wrap raw key bytes, checking the length against the algorithm.
    pub fn from_bytes(enc: ContentEncryption, bytes: Vec<u8>) -> Result<Self, CryptoError> {
        if bytes.len() != enc.key_len() {
            let actual = bytes.len();
            let mut bytes = bytes;
            bytes.zeroize();
            return Err(CryptoError::InvalidKeyLength {
                expected: enc.key_len(),
                actual,
            });
        }
        Ok(Self(bytes))
    }

    /// Generate a random key for the given algorithm.
    pub fn generate(enc: ContentEncryption) -> Self {
        let mut bytes = vec![0u8; enc.key_len()];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Generate a random GCM IV.
pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut iv);
    iv
}

/// Encrypt plaintext, returning `(ciphertext, tag)` split the way JWE carries them.
///
/// # Errors
///
/// Returns `CryptoError::EncryptionFailed` if the cipher rejects the input.
pub fn seal_content(
    enc: ContentEncryption,
    key: &ContentKey,
    iv: &[u8; IV_LEN],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
    let payload = Payload {
        msg: plaintext,
        aad,
    };
    let nonce = Nonce::from_slice(iv);

    let mut sealed = match enc {
        ContentEncryption::A128Gcm => Aes128Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?
            .encrypt(nonce, payload),
        ContentEncryption::A256Gcm => Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?
            .encrypt(nonce, payload),
    }
    .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let tag = sealed.split_off(sealed.len() - TAG_LEN);
    Ok((sealed, tag))
}

/// Decrypt and authenticate ciphertext.
///
/// # Errors
///
/// Returns `CryptoError::InvalidNonceLength` for a wrong IV size and
/// `CryptoError::DecryptionFailed` if authentication fails.
pub fn open_content(
    enc: ContentEncryption,
    key: &ContentKey,
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if iv.len() != IV_LEN {
        return Err(CryptoError::InvalidNonceLength {
            expected: IV_LEN,
            actual: iv.len(),
        });
    }
    if tag.len() != TAG_LEN {
        return Err(CryptoError::DecryptionFailed(format!(
            "authentication tag must be {TAG_LEN} bytes, got {}",
            tag.len()
        )));
    }

    let mut sealed = Vec::with_capacity(ciphertext.len() + TAG_LEN);
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);

    let payload = Payload { msg: &sealed, aad };
    let nonce = Nonce::from_slice(iv);

    match enc {
        ContentEncryption::A128Gcm => Aes128Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?
            .decrypt(nonce, payload),
        ContentEncryption::A256Gcm => Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?
            .decrypt(nonce, payload),
    }
    .map_err(|_| CryptoError::DecryptionFailed("content authentication failed".to_string()))
}
