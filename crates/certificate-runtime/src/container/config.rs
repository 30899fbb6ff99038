//! # Service Configuration
//!
//! Everything the runtime reads from the environment, with defaults.
//!
//! ## Security Requirements
//!
//! - Both key secrets MUST be set; the service refuses to start without them
//! - `CERTIFICATE_INTERNAL_API_KEY` unset is allowed but rejects every event
//! - Secrets are redacted from `Debug` output

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use chrono::FixedOffset;
use cs_01_envelope_intake::KeySecret;
use cs_02_certificate_issuance::adapters::resend::{DEFAULT_MAIL_FROM, DEFAULT_RESEND_API_URL};
use cs_02_certificate_issuance::service::{
    DEFAULT_DISPATCH_TIMEOUT, DEFAULT_MAX_CONCURRENT_DISPATCH, DEFAULT_UTC_OFFSET_HOURS,
};
use cs_02_certificate_issuance::{IssuanceConfig, ResendConfig};
use thiserror::Error;

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port, shared with the gateway's client configuration.
pub const DEFAULT_PORT: u16 = 3003;

/// Offsets in use by civil time zones, in whole hours.
pub const UTC_OFFSET_RANGE_HOURS: std::ops::RangeInclusive<i32> = -12..=14;

/// Complete service configuration.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Transport configuration.
    pub transport: TransportConfig,
    /// Key and credential configuration.
    pub security: SecurityConfig,
    /// Email provider configuration.
    pub mail: MailConfig,
    /// Issuance pipeline configuration.
    pub issuance: IssuanceSettings,
    /// Log output configuration.
    pub logging: LoggingConfig,
}

/// TCP transport configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub host: String,
    pub port: u16,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Key material and access credential, as provisioned.
#[derive(Clone, Default)]
pub struct SecurityConfig {
    /// Base64 of the service's PKCS#8 private key PEM.
    pub private_key_base64: Option<String>,
    /// Base64 of the gateway's SPKI public key PEM.
    pub gateway_public_key_base64: Option<String>,
    /// Expected `x-api-key` value.
    pub internal_api_key: Option<String>,
}

/// Email provider configuration.
#[derive(Clone)]
pub struct MailConfig {
    pub resend_api_key: Option<String>,
    pub resend_api_url: String,
    pub from: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            resend_api_key: None,
            resend_api_url: DEFAULT_RESEND_API_URL.to_string(),
            from: DEFAULT_MAIL_FROM.to_string(),
        }
    }
}

/// Issuance pipeline tuning.
#[derive(Debug, Clone)]
pub struct IssuanceSettings {
    /// Hours east of UTC for the issuance timestamp.
    pub utc_offset_hours: i32,
    /// Concurrent sends allowed.
    pub max_concurrent_dispatch: usize,
    /// Per-send timeout in seconds.
    pub dispatch_timeout_secs: u64,
    /// Duplicate suppression window in seconds. 0 disables it.
    pub redelivery_window_secs: u64,
}

impl Default for IssuanceSettings {
    fn default() -> Self {
        Self {
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            max_concurrent_dispatch: DEFAULT_MAX_CONCURRENT_DISPATCH,
            dispatch_timeout_secs: DEFAULT_DISPATCH_TIMEOUT.as_secs(),
            redelivery_window_secs: 0,
        }
    }
}

/// Log output configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("{name}={value:?} is not a valid {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    /// A key secret is not set.
    #[error("{0} is not set")]
    MissingKey(KeySecret),

    /// The UTC offset is outside the civil range, UTC-12 to UTC+14.
    #[error("CERTIFICATE_UTC_OFFSET_HOURS={0} is out of range")]
    OffsetOutOfRange(i32),

    /// The dispatch cap would block every send.
    #[error("CERTIFICATE_MAX_CONCURRENT_DISPATCH must be at least 1")]
    ZeroDispatchSlots,

    /// The dispatch timeout would fail every send.
    #[error("CERTIFICATE_DISPATCH_TIMEOUT_SECS must be at least 1")]
    ZeroDispatchTimeout,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            security: SecurityConfig::default(),
            mail: MailConfig::default(),
            issuance: IssuanceSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of variables.
    ///
    /// Empty values count as unset.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v)| !v.trim().is_empty())
            .collect();
        let get = |name: &str| vars.get(name).cloned();

        let mut config = Self::default();

        if let Some(host) = get("CERTIFICATE_HOST") {
            config.transport.host = host;
        }
        if let Some(port) = get("PORT") {
            config.transport.port = parse("PORT", port, "port number")?;
        }

        config.security = SecurityConfig {
            private_key_base64: get(KeySecret::ServicePrivateKey.env_var()),
            gateway_public_key_base64: get(KeySecret::GatewayPublicKey.env_var()),
            internal_api_key: get("CERTIFICATE_INTERNAL_API_KEY"),
        };

        config.mail.resend_api_key = get("RESEND_API_KEY");
        if let Some(url) = get("RESEND_API_URL") {
            config.mail.resend_api_url = url;
        }
        if let Some(from) = get("CERTIFICATE_MAIL_FROM") {
            config.mail.from = from;
        }

        if let Some(v) = get("CERTIFICATE_UTC_OFFSET_HOURS") {
            config.issuance.utc_offset_hours =
                parse("CERTIFICATE_UTC_OFFSET_HOURS", v, "whole number of hours")?;
        }
        if let Some(v) = get("CERTIFICATE_MAX_CONCURRENT_DISPATCH") {
            config.issuance.max_concurrent_dispatch =
                parse("CERTIFICATE_MAX_CONCURRENT_DISPATCH", v, "count")?;
        }
        if let Some(v) = get("CERTIFICATE_DISPATCH_TIMEOUT_SECS") {
            config.issuance.dispatch_timeout_secs =
                parse("CERTIFICATE_DISPATCH_TIMEOUT_SECS", v, "number of seconds")?;
        }
        if let Some(v) = get("CERTIFICATE_REDELIVERY_WINDOW_SECS") {
            config.issuance.redelivery_window_secs =
                parse("CERTIFICATE_REDELIVERY_WINDOW_SECS", v, "number of seconds")?;
        }

        if let Some(level) = get("CERTIFICATE_LOG_LEVEL").or_else(|| get("RUST_LOG")) {
            config.logging.level = level;
        }
        if let Some(v) = get("CERTIFICATE_JSON_LOGS") {
            config.logging.json = parse_flag("CERTIFICATE_JSON_LOGS", v)?;
        }

        Ok(config)
    }

    /// Validate the configuration before anything is started.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - either key secret is missing
    /// - the UTC offset is out of range
    /// - the dispatch cap or timeout is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.private_key_base64.is_none() {
            return Err(ConfigError::MissingKey(KeySecret::ServicePrivateKey));
        }
        if self.security.gateway_public_key_base64.is_none() {
            return Err(ConfigError::MissingKey(KeySecret::GatewayPublicKey));
        }
        self.utc_offset()?;
        if self.issuance.max_concurrent_dispatch == 0 {
            return Err(ConfigError::ZeroDispatchSlots);
        }
        if self.issuance.dispatch_timeout_secs == 0 {
            return Err(ConfigError::ZeroDispatchTimeout);
        }
        Ok(())
    }

    /// Address the transport binds to.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.transport.host, self.transport.port);
        addr.parse().map_err(|_| ConfigError::Invalid {
            name: "CERTIFICATE_HOST",
            value: self.transport.host.clone(),
            expected: "IP address",
        })
    }

    /// Issuance timestamp offset.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        let hours = self.issuance.utc_offset_hours;
        if !UTC_OFFSET_RANGE_HOURS.contains(&hours) {
            return Err(ConfigError::OffsetOutOfRange(hours));
        }
        FixedOffset::east_opt(hours * 3600).ok_or(ConfigError::OffsetOutOfRange(hours))
    }

    /// Issuance pipeline settings.
    pub fn issuance_config(&self) -> Result<IssuanceConfig, ConfigError> {
        Ok(IssuanceConfig {
            max_concurrent_dispatch: self.issuance.max_concurrent_dispatch,
            dispatch_timeout: self.dispatch_timeout(),
            utc_offset: self.utc_offset()?,
        })
    }

    /// Per-send timeout.
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.issuance.dispatch_timeout_secs)
    }

    /// Email provider settings.
    pub fn resend_config(&self) -> ResendConfig {
        ResendConfig {
            api_key: self.mail.resend_api_key.clone(),
            api_url: self.mail.resend_api_url.clone(),
            from: self.mail.from.clone(),
        }
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("ServiceConfig")
            .field("transport", &self.transport)
            .field("private_key", &redact(&self.security.private_key_base64))
            .field(
                "gateway_public_key",
                &redact(&self.security.gateway_public_key_base64),
            )
            .field("internal_api_key", &redact(&self.security.internal_api_key))
            .field("resend_api_key", &redact(&self.mail.resend_api_key))
            .field("resend_api_url", &self.mail.resend_api_url)
            .field("from", &self.mail.from)
            .field("issuance", &self.issuance)
            .field("logging", &self.logging)
            .finish()
    }
}

fn parse<T: std::str::FromStr>(
    name: &'static str,
    value: String,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value,
        expected,
    })
}

fn parse_flag(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value,
            expected: "boolean",
        }),
    }
}
