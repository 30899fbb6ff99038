//! Adapters for the outbound ports.

pub mod pdf;
pub mod redelivery;
pub mod resend;

pub use pdf::PdfCertificateRenderer;
pub use redelivery::{AcceptAll, WindowedRedeliveryGuard};
pub use resend::{ResendConfig, ResendMailer};
