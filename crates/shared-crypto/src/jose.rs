//! # Compact JOSE (JWE + JWS)
//!
//! The gateway nests a signed token inside an encrypted one:
//!
//! ```text
//! JWE(RSA-OAEP-256, A256GCM) ──contains──▶ JWS(PS256) ──contains──▶ JSON payload
//! ```
//!
//! Only the algorithms of that protocol are accepted. A header naming any
//! other `alg`/`enc`, asking for compression, or declaring critical
//! extensions is rejected before any key is touched.

use crate::rsa_keys::{
    DecryptionKey, EncryptionKey, SigningKey, VerificationKey, KEY_MANAGEMENT_ALG, SIGNATURE_ALG,
};
use crate::symmetric::{self, ContentEncryption, ContentKey};
use crate::CryptoError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

/// Protected header of a compact JWE.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JweHeader {
    /// Key management algorithm.
    pub alg: String,
    /// Content encryption algorithm.
    pub enc: String,
    /// Compression algorithm (unsupported).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    /// Critical extensions (unsupported).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crit: Option<Vec<String>>,
    /// Content type of the plaintext.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cty: Option<String>,
}

/// Protected header of a compact JWS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwsHeader {
    /// Signature algorithm.
    pub alg: String,
    /// RFC 7797 unencoded payload flag (unsupported when `false`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b64: Option<bool>,
    /// Critical extensions (unsupported).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crit: Option<Vec<String>>,
    /// Token type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

fn b64_decode(segment: &str, what: &str) -> Result<Vec<u8>, CryptoError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| CryptoError::MalformedCompact(format!("{what}: {e}")))
}

fn b64_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

fn split_exact<'a, const N: usize>(compact: &'a str, what: &str) -> Result<[&'a str; N], CryptoError> {
    let parts: Vec<&str> = compact.split('.').collect();
    parts.try_into().map_err(|parts: Vec<&str>| {
        CryptoError::MalformedCompact(format!(
            "{what} must have {N} segments, found {}",
            parts.len()
        ))
    })
}

fn parse_header<T: for<'de> Deserialize<'de>>(segment: &str, what: &str) -> Result<T, CryptoError> {
    let raw = b64_decode(segment, what)?;
    serde_json::from_slice(&raw)
        .map_err(|e| CryptoError::MalformedCompact(format!("{what}: {e}")))
}

/// Decrypt a compact JWE and return its plaintext.
///
/// # Errors
///
/// - `CryptoError::MalformedCompact` - wrong segment count or bad encoding
/// - `CryptoError::UnsupportedAlgorithm` - header outside the protocol
/// - `CryptoError::DecryptionFailed` - key unwrap or content authentication failed
pub fn decrypt_compact(key: &DecryptionKey, compact: &str) -> Result<Vec<u8>, CryptoError> {
    let [header_b64, encrypted_key_b64, iv_b64, ciphertext_b64, tag_b64] =
        split_exact::<5>(compact, "JWE")?;

    let header: JweHeader = parse_header(header_b64, "JWE header")?;
    if header.alg != KEY_MANAGEMENT_ALG {
        return Err(CryptoError::UnsupportedAlgorithm(header.alg));
    }
    let enc = ContentEncryption::from_header(&header.enc)?;
    if let Some(zip) = header.zip {
        return Err(CryptoError::UnsupportedAlgorithm(format!("zip={zip}")));
    }
    if header.crit.is_some() {
        return Err(CryptoError::UnsupportedAlgorithm("crit".to_string()));
    }

    let encrypted_key = b64_decode(encrypted_key_b64, "JWE encrypted key")?;
    let iv = b64_decode(iv_b64, "JWE iv")?;
    let ciphertext = b64_decode(ciphertext_b64, "JWE ciphertext")?;
    let tag = b64_decode(tag_b64, "JWE tag")?;

    let cek = ContentKey::from_bytes(enc, key.decrypt(&encrypted_key)?)?;

    symmetric::open_content(enc, &cek, &iv, header_b64.as_bytes(), &ciphertext, &tag)
}

/// Verify a compact JWS and return its payload bytes.
///
/// # Errors
///
/// - `CryptoError::MalformedCompact` - wrong segment count or bad encoding
/// - `CryptoError::UnsupportedAlgorithm` - header outside the protocol
/// - `CryptoError::SignatureVerificationFailed` - signature does not match
pub fn verify_compact(key: &VerificationKey, compact: &str) -> Result<Vec<u8>, CryptoError> {
    let [header_b64, payload_b64, signature_b64] = split_exact::<3>(compact, "JWS")?;

    let header: JwsHeader = parse_header(header_b64, "JWS header")?;
    if header.alg != SIGNATURE_ALG {
        return Err(CryptoError::UnsupportedAlgorithm(header.alg));
    }
    if header.b64 == Some(false) {
        return Err(CryptoError::UnsupportedAlgorithm("b64=false".to_string()));
    }
    if header.crit.is_some() {
        return Err(CryptoError::UnsupportedAlgorithm("crit".to_string()));
    }

    let signature = b64_decode(signature_b64, "JWS signature")?;
    let signing_input = format!("{header_b64}.{payload_b64}");
    key.verify(signing_input.as_bytes(), &signature)?;

    b64_decode(payload_b64, "JWS payload")
}

/// Produce a compact PS256 JWS over `payload`.
pub fn sign_compact(key: &SigningKey, payload: &[u8]) -> Result<String, CryptoError> {
    let header = JwsHeader {
        alg: SIGNATURE_ALG.to_string(),
        b64: None,
        crit: None,
        typ: None,
    };
    let header_json =
        serde_json::to_vec(&header).map_err(|e| CryptoError::InvalidInput(e.to_string()))?;
    let signing_input = format!("{}.{}", b64_encode(&header_json), b64_encode(payload));
    let signature = key.sign(signing_input.as_bytes())?;
    Ok(format!("{signing_input}.{}", b64_encode(&signature)))
}

/// Produce a compact RSA-OAEP-256 JWE over `plaintext`.
pub fn encrypt_compact(
    key: &EncryptionKey,
    enc: ContentEncryption,
    plaintext: &[u8],
) -> Result<String, CryptoError> {
    let header = JweHeader {
        alg: KEY_MANAGEMENT_ALG.to_string(),
        enc: enc.header_name().to_string(),
        zip: None,
        crit: None,
        cty: None,
    };
    let header_json =
        serde_json::to_vec(&header).map_err(|e| CryptoError::InvalidInput(e.to_string()))?;
    let header_b64 = b64_encode(&header_json);

    let cek = ContentKey::generate(enc);
    let encrypted_key = key.encrypt(cek.as_bytes())?;
    let iv = symmetric::generate_iv();
    let (ciphertext, tag) =
        symmetric::seal_content(enc, &cek, &iv, header_b64.as_bytes(), plaintext)?;

    Ok(format!(
        "{header_b64}.{}.{}.{}.{}",
        b64_encode(&encrypted_key),
        b64_encode(&iv),
        b64_encode(&ciphertext),
        b64_encode(&tag)
    ))
}

/// Sign-then-encrypt, the gateway side of the envelope protocol.
pub fn seal(
    signer: &SigningKey,
    recipient: &EncryptionKey,
    payload: &[u8],
) -> Result<String, CryptoError> {
    let jws = sign_compact(signer, payload)?;
    encrypt_compact(recipient, ContentEncryption::A256Gcm, jws.as_bytes())
}
