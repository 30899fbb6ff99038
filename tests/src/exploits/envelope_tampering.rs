//! # Envelope Tampering
//!
//! An attacker on the path between gateway and service flips bits, truncates
//! or splices the compact JWE. Every variant must fail with the same opaque
//! `EnvelopeError`; none may yield a payload.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, OnceLock};

    use proptest::prelude::*;

    use cs_01_envelope_intake::{EnvelopeError, EnvelopeUnpacker};

    use crate::fixtures::{ana, seal_payload, service_keys};

    fn unpacker() -> &'static EnvelopeUnpacker {
        static UNPACKER: OnceLock<EnvelopeUnpacker> = OnceLock::new();
        UNPACKER.get_or_init(|| EnvelopeUnpacker::new(Arc::new(service_keys())))
    }

    fn sealed() -> &'static str {
        static ENVELOPE: OnceLock<String> = OnceLock::new();
        ENVELOPE.get_or_init(|| seal_payload(&ana()))
    }

    fn flip_bit(envelope: &str, index: usize, bit: u8) -> String {
        let mut bytes = envelope.as_bytes().to_vec();
        let i = index % bytes.len();
        bytes[i] ^= 1 << bit;
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_untampered_envelope_opens() {
        assert_eq!(unpacker().unpack(sealed()).unwrap(), ana());
    }

    proptest! {
        // Each case costs an RSA private-key operation.
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn bit_flip_anywhere_is_rejected(index in any::<usize>(), bit in 0u8..8) {
            let tampered = flip_bit(sealed(), index, bit);
            prop_assert_eq!(unpacker().unpack(&tampered), Err(EnvelopeError));
        }

        #[test]
        fn truncation_is_rejected(keep in 0usize..2048) {
            let envelope = sealed();
            let tampered = &envelope[..keep % envelope.len()];
            prop_assert_eq!(unpacker().unpack(tampered), Err(EnvelopeError));
        }
    }

    #[test]
    fn test_segment_splicing_is_rejected() {
        // Ciphertext of one envelope under the key, IV and tag of another.
        let first: Vec<&str> = sealed().split('.').collect();
        let other = seal_payload(&ana());
        let second: Vec<&str> = other.split('.').collect();

        let spliced = [first[0], first[1], first[2], second[3], first[4]].join(".");
        assert_eq!(unpacker().unpack(&spliced), Err(EnvelopeError));
    }

    #[test]
    fn test_extra_segment_is_rejected() {
        let padded = format!("{}.AAAA", sealed());
        assert_eq!(unpacker().unpack(&padded), Err(EnvelopeError));
    }
}
