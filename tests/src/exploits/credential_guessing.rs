//! # Credential Guessing
//!
//! A client without the internal credential tries to reach the envelope
//! opener: no key, empty key, near-miss keys, keys of the same length and
//! format. The access guard must reject all of them before any decryption
//! is attempted, so guessing cannot be used to drive RSA work.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use cs_01_envelope_intake::{
        AuthorizationError, EnvelopeError, EnvelopeIntakeApi, EnvelopeIntakeService,
        EnvelopeOpener, IntakeError,
    };
    use shared_types::{EventHeaders, VoteConfirmationPayload};

    use crate::fixtures::{ana, INTERNAL_API_KEY};

    /// Opener that only counts how often it is reached.
    #[derive(Clone, Default)]
    struct CountingOpener {
        calls: Arc<AtomicUsize>,
    }

    impl EnvelopeOpener for CountingOpener {
        fn unpack(&self, _envelope: &str) -> Result<VoteConfirmationPayload, EnvelopeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ana())
        }
    }

    fn guess_headers(api_key: Option<&str>) -> EventHeaders {
        EventHeaders {
            api_key: api_key.map(str::to_string),
            security_envelope: Some("a.b.c.d.e".to_string()),
        }
    }

    fn same_length_guesses() -> Vec<String> {
        let mut guesses = Vec::new();
        // Flip each position in turn.
        for i in 0..INTERNAL_API_KEY.len() {
            let mut bytes = INTERNAL_API_KEY.as_bytes().to_vec();
            bytes[i] = if bytes[i] == b'x' { b'y' } else { b'x' };
            guesses.push(String::from_utf8(bytes).unwrap());
        }
        guesses.push(INTERNAL_API_KEY.to_uppercase());
        guesses
    }

    #[test]
    fn test_guessing_never_reaches_opener() {
        let opener = CountingOpener::default();
        let calls = opener.calls.clone();
        let service = EnvelopeIntakeService::new(opener, Some(INTERNAL_API_KEY.to_string()));

        let mut guesses: Vec<String> = vec![
            "".to_string(),
            " ".to_string(),
            INTERNAL_API_KEY[..INTERNAL_API_KEY.len() - 1].to_string(),
            format!("{INTERNAL_API_KEY} "),
            format!("{INTERNAL_API_KEY}{INTERNAL_API_KEY}"),
            "Bearer sevotec-internal-test-key".to_string(),
        ];
        guesses.extend(same_length_guesses());

        assert!(matches!(
            service.open(&guess_headers(None)),
            Err(IntakeError::Unauthorized(AuthorizationError::Missing))
        ));
        for guess in &guesses {
            let result = service.open(&guess_headers(Some(guess)));
            assert!(
                matches!(result, Err(IntakeError::Unauthorized(_))),
                "guess {guess:?} was not rejected"
            );
        }

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unconfigured_service_rejects_everything() {
        let opener = CountingOpener::default();
        let calls = opener.calls.clone();
        let service = EnvelopeIntakeService::new(opener, None);

        for key in [None, Some(""), Some(INTERNAL_API_KEY)] {
            assert!(matches!(
                service.open(&guess_headers(key)),
                Err(IntakeError::Unauthorized(_))
            ));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_correct_key_reaches_opener_once() {
        let opener = CountingOpener::default();
        let calls = opener.calls.clone();
        let service = EnvelopeIntakeService::new(opener, Some(INTERNAL_API_KEY.to_string()));

        assert_eq!(service.open(&guess_headers(Some(INTERNAL_API_KEY))).unwrap(), ana());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
