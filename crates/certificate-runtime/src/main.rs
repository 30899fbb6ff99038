//! # Vote Certificate Service Runtime
//!
//! Entry point of the certificate service of the SEVOTEC electoral pipeline.
//!
//! ## Flow
//!
//! ```text
//! Gateway ──TCP vote.confirmed──→ TcpTransport ──submit/request──→ Intake Queue
//!                                      ↑                                │
//!                                      │ oneshot reply (if id)          ↓
//!                                      └──────────────────── VoteConfirmedHandler
//!                                                              │ CS-01 intake
//!                                                              │ CS-02 issuance
//!                                                              ↓
//!                                                 Event Bus ←─CertificateProcessed
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Install the log subscriber
//! 3. Load key material (exit non-zero on failure, before binding)
//! 4. Wire subsystems and start the handler
//! 5. Bind the TCP listener
//! 6. Run until Ctrl+C

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use shared_bus::{intake_channel, EventPublisher, DEFAULT_INTAKE_CAPACITY};
use tracing::{error, info};

use certificate_runtime::adapters::TcpTransport;
use certificate_runtime::container::config::LoggingConfig;
use certificate_runtime::logging::init_logging;
use certificate_runtime::{ServiceConfig, ServiceContainer, VoteConfirmedHandler};

/// Time a request may wait for its outcome beyond the dispatch timeout.
const REPLY_MARGIN: Duration = Duration::from_secs(30);

/// Time given to in-flight work after the shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// The runtime owning the wired subsystems.
pub struct CertificateRuntime {
    config: ServiceConfig,
    container: ServiceContainer,
    shutdown_tx: tokio::sync::watch::Sender<bool>,
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
}

impl CertificateRuntime {
    /// Build the runtime. Fails if the keys cannot be loaded.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let container =
            ServiceContainer::new(&config).context("Failed to initialize certificate service")?;
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

        Ok(Self {
            config,
            container,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Start the handler, then the transport.
    pub async fn start(&self) -> Result<()> {
        info!("===========================================");
        info!("  Vote Certificate Service v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let handler = Arc::new(VoteConfirmedHandler::new(
            Arc::clone(&self.container.intake),
            Arc::clone(&self.container.issuance),
        ));
        let (intake_tx, intake_rx) = intake_channel(DEFAULT_INTAKE_CAPACITY);
        let bus: Arc<dyn EventPublisher> = self.container.event_bus.clone();
        let mut handler_shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = handler.run(intake_rx, bus) => {}
                _ = handler_shutdown.changed() => {
                    info!("[handler] Shutdown signal received");
                }
            }
        });

        let addr = self.config.bind_addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        let transport = Arc::new(
            TcpTransport::new(intake_tx)
                .with_reply_timeout(self.config.dispatch_timeout() + REPLY_MARGIN),
        );
        let transport_shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            if let Err(e) = transport.serve(listener, transport_shutdown).await {
                error!(error = %e, "Transport stopped");
            }
        });

        info!(port = addr.port(), "Certificate Service running");
        Ok(())
    }

    /// Signal shutdown and give in-flight work a moment to finish.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        tokio::time::sleep(SHUTDOWN_GRACE).await;

        info!("Shutdown complete");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServiceConfig::from_env();

    // Log with defaults if the configuration itself is broken.
    let logging = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_else(|_| LoggingConfig::default());
    init_logging(&logging)?;

    let config = config.context("Invalid configuration")?;
    info!(?config, "Configuration loaded");

    let runtime = CertificateRuntime::new(config)?;
    runtime.start().await?;

    info!("Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;

    Ok(())
}
