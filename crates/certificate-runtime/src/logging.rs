//! Log subscriber setup.

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::container::config::LoggingConfig;

/// The subscriber could not be installed.
#[derive(Debug, Error)]
#[error("cannot initialise logging: {0}")]
pub struct LoggingError(String);

/// Install the global `tracing` subscriber.
///
/// The filter comes from `CERTIFICATE_LOG_LEVEL`, then `RUST_LOG`, then
/// `info`. JSON lines are for containers; the plain format is for terminals.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let env_filter = EnvFilter::try_new(&config.level).map_err(|e| LoggingError(e.to_string()))?;

    if config.json {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| LoggingError(e.to_string()))
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| LoggingError(e.to_string()))
    }
}
