//! # Integration Test Flows
//!
//! The real intake (CS-01) and issuance (CS-02) subsystems behind the
//! `VoteConfirmedHandler`, with only the email provider replaced.
//!
//! ## Flows Tested:
//!
//! 1. **Sealed confirmation → one email**: decrypt, verify, validate, render, dispatch
//! 2. **Provider failure**: reported as a failed result, nothing panics
//! 3. **Incomplete voter data**: nothing rendered, nothing sent
//! 4. **Queue round trip**: the reply comes back to the requester and the
//!    outcome is published as `CertificateProcessed`

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    use certificate_runtime::VoteConfirmedHandler;
    use cs_02_certificate_issuance::domain::{CERTIFICATE_SUBJECT, ISSUED_MESSAGE};
    use shared_bus::{intake_channel, EventFilter, InMemoryEventBus, DEFAULT_INTAKE_CAPACITY};
    use shared_types::{ProcessResult, VoteConfirmedEvent};

    use crate::fixtures::{
        ana, headers, intake_service, issuance_service, seal_payload, FailingMailer,
        RecordingMailer,
    };

    fn handler_with<M>(mailer: M) -> VoteConfirmedHandler
    where
        M: cs_02_certificate_issuance::CertificateMailer + 'static,
    {
        VoteConfirmedHandler::new(
            Arc::new(intake_service()),
            Arc::new(issuance_service(mailer)),
        )
    }

    // =============================================================================
    // HAPPY PATH
    // =============================================================================

    #[tokio::test]
    async fn test_sealed_confirmation_sends_one_certificate() {
        let mailer = RecordingMailer::new();
        let handler = handler_with(mailer.clone());

        let event = VoteConfirmedEvent::new(headers(seal_payload(&ana())));
        let outcome = handler.handle(&event).await;

        assert_eq!(outcome.result, ProcessResult::succeeded(ISSUED_MESSAGE));
        assert_eq!(outcome.cedula.as_deref(), Some("0102030405"));

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1, "exactly one email");
        let email = &sent[0];
        assert_eq!(email.to, "ana@example.com");
        assert_eq!(email.subject, CERTIFICATE_SUBJECT);
        assert!(email.html.contains("Ana Paredes"));
        assert_eq!(email.attachment.filename, "Certificado_Votacion_0102030405.pdf");
        assert!(email.attachment.content.starts_with(b"%PDF"));
    }

    // =============================================================================
    // FAILURE PATHS
    // =============================================================================

    #[tokio::test]
    async fn test_provider_failure_is_reported() {
        let mailer = FailingMailer::default();
        let attempts = mailer.attempts.clone();
        let handler = handler_with(mailer);

        let event = VoteConfirmedEvent::new(headers(seal_payload(&ana())));
        let outcome = handler.handle(&event).await;

        assert!(!outcome.result.success);
        assert_eq!(
            outcome.result.message,
            "Error enviando certificado: Error del servicio de email: The sending domain is not verified"
        );
        assert_eq!(*attempts.lock(), 1, "one attempt, no retries");
    }

    #[tokio::test]
    async fn test_empty_name_sends_nothing() {
        let mailer = RecordingMailer::new();
        let handler = handler_with(mailer.clone());

        let mut voter = ana();
        voter.nombres = String::new();
        let event = VoteConfirmedEvent::new(headers(seal_payload(&voter)));
        let outcome = handler.handle(&event).await;

        assert_eq!(
            outcome.result,
            ProcessResult::failed("Datos incompletos: nombres, cédula y email son requeridos")
        );
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_credential_sends_nothing() {
        let mailer = RecordingMailer::new();
        let handler = handler_with(mailer.clone());

        let mut h = headers(seal_payload(&ana()));
        h.api_key = Some("guess".to_string());
        let outcome = handler.handle(&VoteConfirmedEvent::new(h)).await;

        assert_eq!(
            outcome.result,
            ProcessResult::failed("Acceso denegado: API Key inválida")
        );
        assert_eq!(outcome.cedula, None);
        assert!(mailer.sent().is_empty());
    }

    // =============================================================================
    // INTAKE QUEUE AND OUTCOME BUS
    // =============================================================================

    #[tokio::test]
    async fn test_queued_request_replies_and_publishes_outcome() {
        let bus = Arc::new(InMemoryEventBus::new());
        let (sender, receiver) = intake_channel(DEFAULT_INTAKE_CAPACITY);
        let mailer = RecordingMailer::new();
        let handler = Arc::new(handler_with(mailer.clone()));
        tokio::spawn(handler.run(receiver, bus.clone()));

        let event = VoteConfirmedEvent::new(headers(seal_payload(&ana())));
        let mut published = bus.subscribe(EventFilter::outcome_of(event.correlation_id));
        let reply = sender.request(event.clone()).await.expect("queue open");

        let result = timeout(Duration::from_secs(10), reply)
            .await
            .expect("reply within timeout")
            .expect("reply sent");
        assert_eq!(result, ProcessResult::succeeded(ISSUED_MESSAGE));

        let processed = timeout(Duration::from_secs(10), published.recv())
            .await
            .expect("outcome within timeout")
            .expect("bus open");
        assert_eq!(processed.correlation_id, event.correlation_id);
        assert_eq!(processed.cedula.as_deref(), Some("0102030405"));
        assert_eq!(processed.result, result);
        assert_eq!(mailer.sent().len(), 1);
    }
}
