//! # Certificate Issuance Subsystem (CS-02)
//!
//! Turns a verified vote confirmation into a delivered voting certificate.
//!
//! ## Pipeline
//!
//! | Stage | Failure | Effect |
//! |-------|---------|--------|
//! | Validate | `ValidationError` | nothing rendered or sent |
//! | Render | `RenderError` | nothing sent |
//! | Dispatch | `DeliveryError` | reported, no retry |
//!
//! Every run ends in a `ProcessResult`; nothing propagates to the caller.
//!
//! ## Outbound Dependencies
//!
//! | Port | Purpose |
//! |------|---------|
//! | `CertificateRenderer` | PDF document |
//! | `CertificateMailer` | Email delivery |
//! | `RedeliveryGuard` | Optional duplicate suppression |
//! | `TimeSource` | Issuance timestamp |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! adapters/  - printpdf renderer, Resend mailer, redelivery guards
//! ports/     - CertificateIssuanceApi (in), renderer/mailer/guard/clock (out)
//! domain/    - entities, validation, errors
//! service.rs - IssuanceService
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::{
    AcceptAll, PdfCertificateRenderer, ResendConfig, ResendMailer, WindowedRedeliveryGuard,
};
pub use domain::{
    attachment_filename, Attachment, Certificate, CertificateEmail, DeliveryError,
    DeliveryReceipt, DuplicateDelivery, IssuanceError, RedeliveryClaim, RenderError,
    ValidationError, VoterRecord,
};
pub use ports::inbound::CertificateIssuanceApi;
pub use ports::outbound::{
    CertificateMailer, CertificateRenderer, RedeliveryGuard, SystemTimeSource, TimeSource,
};
pub use service::{IssuanceConfig, IssuanceService};
