//! # Certificate Entities
//!
//! What gets rendered and what gets sent. Wording is fixed by the electoral
//! authority and kept here in one place.

use chrono::{DateTime, FixedOffset};

/// Email subject line.
pub const CERTIFICATE_SUBJECT: &str = "Certificado de Votación SEVOTEC";

/// Document title.
pub const CERTIFICATE_TITLE: &str = "CERTIFICADO DE VOTACIÓN";

/// Closing line of the document.
pub const CERTIFICATE_FOOTER: &str =
    "Este documento certifica la participación ciudadana en el proceso electoral.";

/// Printed when the gateway did not supply a voting location.
pub const UNKNOWN_LOCATION: &str = "N/A";

/// `dd/mm/yyyy, HH:MM:SS`, as printed on the certificate.
pub const ISSUED_AT_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Message of a successful `ProcessResult`.
pub const ISSUED_MESSAGE: &str = "Certificado generado y enviado correctamente";

/// Voter data that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterRecord {
    pub nombres: String,
    pub cedula: String,
    pub email: String,
    pub recinto: Option<String>,
}

/// Content of one certificate document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub nombres: String,
    pub cedula: String,
    /// Already formatted with [`ISSUED_AT_FORMAT`].
    pub issued_at: String,
    /// Voting location, or [`UNKNOWN_LOCATION`].
    pub recinto: String,
}

impl Certificate {
    /// Certificate for `record`, issued at `issued_at`.
    pub fn new(record: &VoterRecord, issued_at: DateTime<FixedOffset>) -> Self {
        let recinto = record
            .recinto
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(UNKNOWN_LOCATION)
            .to_string();

        Self {
            nombres: record.nombres.clone(),
            cedula: record.cedula.clone(),
            issued_at: issued_at.format(ISSUED_AT_FORMAT).to_string(),
            recinto,
        }
    }

    /// Body lines in print order.
    pub fn body_lines(&self) -> [String; 4] {
        [
            format!("Nombre: {}", self.nombres),
            format!("Cédula de Identidad: {}", self.cedula),
            format!("Fecha de emisión: {}", self.issued_at),
            format!("Recinto de votación: {}", self.recinto),
        ]
    }
}

/// A file attached to an email.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("bytes", &self.content.len())
            .finish()
    }
}

/// Attachment name for a voter's certificate.
pub fn attachment_filename(cedula: &str) -> String {
    format!("Certificado_Votacion_{cedula}.pdf")
}

/// The email carrying one certificate. Always exactly one attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attachment: Attachment,
}

impl CertificateEmail {
    /// Email delivering `pdf` to the voter in `record`.
    pub fn new(record: &VoterRecord, pdf: Vec<u8>) -> Self {
        Self {
            to: record.email.clone(),
            subject: CERTIFICATE_SUBJECT.to_string(),
            html: greeting_html(&record.nombres),
            attachment: Attachment {
                filename: attachment_filename(&record.cedula),
                content: pdf,
            },
        }
    }
}

/// Provider acknowledgement of a sent email.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Provider message id, when the provider returns one.
    pub id: Option<String>,
}

/// Right to issue for one voter, handed back to the guard on failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedeliveryClaim {
    /// Guard-specific key; empty when the guard tracks nothing.
    pub key: String,
    /// Unix seconds at which the claim was granted.
    pub claimed_at: u64,
}

fn greeting_html(nombres: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #2563eb; text-align: center;">Certificado de Votación</h2>
  <p>Estimado/a <strong>{name}</strong>,</p>
  <p>Nos complace informarle que su participación en el proceso electoral ha sido registrada exitosamente.</p>
  <p>Adjunto a este correo encontrará su certificado oficial de votación en formato PDF.</p>
  <p style="margin-top: 30px;">Gracias por cumplir con su deber cívico y contribuir a la democracia.</p>
  <hr style="margin: 30px 0; border: none; border-top: 1px solid #e5e7eb;">
  <p style="font-size: 12px; color: #6b7280; text-align: center;">
    SEVOTEC - Sistema Electoral Verificable y Transparente<br>
    Este es un mensaje automático, por favor no responda.
  </p>
</div>"#,
        name = escape_html(nombres)
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
