//! # Redelivery Flood
//!
//! The same confirmation delivered many times, concurrently, as a retrying
//! or replaying gateway would. With the redelivery window enabled only one
//! certificate goes out; a failed dispatch gives the claim back so a later
//! redelivery can still succeed.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use cs_02_certificate_issuance::{
        CertificateEmail, CertificateIssuanceApi, CertificateMailer, DeliveryError,
        DeliveryReceipt, DuplicateDelivery, WindowedRedeliveryGuard,
    };

    use crate::fixtures::{ana, issuance_service, RecordingMailer};

    const WINDOW_SECS: u64 = 600;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_redeliveries_send_one_email() {
        let mailer = RecordingMailer::new();
        let service = Arc::new(
            issuance_service(mailer.clone())
                .with_redelivery_guard(WindowedRedeliveryGuard::new(WINDOW_SECS)),
        );

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.issue(ana()).await })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert_eq!(results.iter().filter(|r| r.success).count(), 1);
        assert!(results
            .iter()
            .filter(|r| !r.success)
            .all(|r| r.message == DuplicateDelivery.to_string()));
        assert_eq!(mailer.sent().len(), 1);
    }

    /// Fails the first send, accepts the rest.
    #[derive(Default)]
    struct FlakyMailer {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl CertificateMailer for FlakyMailer {
        async fn send(&self, _email: CertificateEmail) -> Result<DeliveryReceipt, DeliveryError> {
            if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(DeliveryError::Transport("connection reset".to_string()));
            }
            Ok(DeliveryReceipt::default())
        }
    }

    #[tokio::test]
    async fn test_failed_dispatch_allows_retry() {
        let service = issuance_service(FlakyMailer::default())
            .with_redelivery_guard(WindowedRedeliveryGuard::new(WINDOW_SECS));

        let first = service.issue(ana()).await;
        let second = service.issue(ana()).await;
        let third = service.issue(ana()).await;

        assert!(!first.success);
        assert!(second.success);
        assert_eq!(third.message, DuplicateDelivery.to_string());
    }

    #[tokio::test]
    async fn test_default_guard_accepts_every_delivery() {
        let mailer = RecordingMailer::new();
        let service = issuance_service(mailer.clone());

        for _ in 0..3 {
            assert!(service.issue(ana()).await.success);
        }
        assert_eq!(mailer.sent().len(), 3);
    }
}
