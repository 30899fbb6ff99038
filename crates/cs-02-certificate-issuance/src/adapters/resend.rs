//! Resend HTTP API mailer.

use crate::domain::entities::{CertificateEmail, DeliveryReceipt};
use crate::domain::errors::DeliveryError;
use crate::ports::outbound::CertificateMailer;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// Default Resend endpoint.
pub const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Default sender.
pub const DEFAULT_MAIL_FROM: &str = "SEVOTEC <onboarding@resend.dev>";

/// Resend connection settings.
#[derive(Clone)]
pub struct ResendConfig {
    /// API key; `None` makes every send fail with `NotConfigured`.
    pub api_key: Option<String>,
    pub api_url: String,
    pub from: String,
}

impl Default for ResendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_RESEND_API_URL.to_string(),
            from: DEFAULT_MAIL_FROM.to_string(),
        }
    }
}

impl std::fmt::Debug for ResendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("from", &self.from)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    attachments: [AttachmentBody<'a>; 1],
}

#[derive(Debug, Serialize)]
struct AttachmentBody<'a> {
    filename: &'a str,
    /// Base64 of the file bytes.
    content: String,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: Option<String>,
    name: Option<String>,
}

/// Mailer backed by the Resend API.
pub struct ResendMailer {
    client: Client,
    config: ResendConfig,
}

impl ResendMailer {
    /// Create a mailer. The HTTP client carries its own `request_timeout`;
    /// the service applies the dispatch timeout on top.
    pub fn new(config: ResendConfig, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl CertificateMailer for ResendMailer {
    async fn send(&self, email: CertificateEmail) -> Result<DeliveryReceipt, DeliveryError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(DeliveryError::NotConfigured)?;

        let body = SendEmailRequest {
            from: &self.config.from,
            to: [email.to.as_str()],
            subject: &email.subject,
            html: &email.html,
            attachments: [AttachmentBody {
                filename: &email.attachment.filename,
                content: STANDARD.encode(&email.attachment.content),
            }],
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(to = %email.to, error = %e, "Email provider unreachable");
                if e.is_connect() {
                    DeliveryError::Transport(format!("Cannot connect to {}", self.config.api_url))
                } else {
                    DeliveryError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ProviderErrorBody>().await {
                Ok(ProviderErrorBody {
                    message: Some(message),
                    ..
                }) => message,
                Ok(ProviderErrorBody {
                    name: Some(name), ..
                }) => name,
                _ => status.to_string(),
            };
            error!(to = %email.to, status = status.as_u16(), %message, "Email provider rejected message");
            return Err(DeliveryError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let receipt = response
            .json::<SendEmailResponse>()
            .await
            .map(|r| DeliveryReceipt { id: r.id })
            .unwrap_or_default();

        debug!(to = %email.to, id = ?receipt.id, "Email accepted by provider");
        Ok(receipt)
    }
}
