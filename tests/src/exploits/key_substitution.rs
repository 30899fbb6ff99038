//! # Key Substitution
//!
//! Envelopes that are well-formed but were not produced by the gateway for
//! this service:
//!
//! - signed by a key the service does not trust
//! - encrypted to a different recipient
//! - carrying an unsigned (`alg: none`) inner token
//! - sealed with a weaker content cipher but otherwise valid (accepted)
//!
//! Rejections must be indistinguishable from each other.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    use cs_01_envelope_intake::{
        EnvelopeError, EnvelopeIntakeApi, EnvelopeUnpacker, IntakeError,
    };
    use shared_crypto::{encrypt_compact, seal, sign_compact, ContentEncryption};

    use crate::fixtures::{
        ana, gateway_signer, headers, intake_service, service_keys, service_recipient,
        unrelated_recipient, unrelated_signer,
    };

    fn unpacker() -> EnvelopeUnpacker {
        EnvelopeUnpacker::new(Arc::new(service_keys()))
    }

    fn payload_json() -> Vec<u8> {
        serde_json::to_vec(&ana()).unwrap()
    }

    #[test]
    fn test_forged_signer_rejected() {
        let envelope = seal(&unrelated_signer(), &service_recipient(), &payload_json()).unwrap();
        assert_eq!(unpacker().unpack(&envelope), Err(EnvelopeError));
    }

    #[test]
    fn test_wrong_recipient_rejected() {
        let envelope = seal(&gateway_signer(), &unrelated_recipient(), &payload_json()).unwrap();
        assert_eq!(unpacker().unpack(&envelope), Err(EnvelopeError));
    }

    #[test]
    fn test_unsigned_inner_token_rejected() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload_json());
        let unsigned = format!("{header}.{body}.");

        let envelope =
            encrypt_compact(&service_recipient(), ContentEncryption::A256Gcm, unsigned.as_bytes())
                .unwrap();
        assert_eq!(unpacker().unpack(&envelope), Err(EnvelopeError));
    }

    #[test]
    fn test_signature_stripped_and_replaced_rejected() {
        // Valid gateway JWS with the signature of a different payload.
        let genuine = sign_compact(&gateway_signer(), &payload_json()).unwrap();
        let other = sign_compact(&gateway_signer(), br#"{"cedula":"9999999999"}"#).unwrap();
        let genuine_parts: Vec<&str> = genuine.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let swapped = [genuine_parts[0], other_parts[1], genuine_parts[2]].join(".");

        let envelope =
            encrypt_compact(&service_recipient(), ContentEncryption::A256Gcm, swapped.as_bytes())
                .unwrap();
        assert_eq!(unpacker().unpack(&envelope), Err(EnvelopeError));
    }

    #[test]
    fn test_a128gcm_envelope_accepted() {
        let jws = sign_compact(&gateway_signer(), &payload_json()).unwrap();
        let envelope =
            encrypt_compact(&service_recipient(), ContentEncryption::A128Gcm, jws.as_bytes())
                .unwrap();

        assert_eq!(unpacker().unpack(&envelope).unwrap(), ana());
    }

    #[test]
    fn test_rejections_are_indistinguishable() {
        let forged = seal(&unrelated_signer(), &service_recipient(), &payload_json()).unwrap();
        let misaddressed = seal(&gateway_signer(), &unrelated_recipient(), &payload_json()).unwrap();

        let service = intake_service();
        let a = service.open(&headers(forged)).unwrap_err();
        let b = service.open(&headers(misaddressed)).unwrap_err();
        let c = service.open(&headers("garbage")).unwrap_err();

        assert_eq!(a, IntakeError::InvalidEnvelope(EnvelopeError));
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.to_string(), c.to_string());
    }

    #[test]
    fn test_missing_envelope_rejected_before_decryption() {
        let service = intake_service();
        let mut h = headers("");
        assert_eq!(service.open(&h), Err(IntakeError::MissingEnvelope));

        h.security_envelope = None;
        let err = service.open(&h).unwrap_err();
        assert_eq!(err, IntakeError::MissingEnvelope);
        assert_eq!(
            err.to_string(),
            "Falta sobre de seguridad requerido (x-security-envelope)"
        );
    }
}
