//! # TCP Transport
//!
//! Serves the gateway's microservice transport and feeds the intake queue.
//!
//! ## Packets
//!
//! ```text
//! inbound:  {"pattern":"vote.confirmed","data":{"headers":{...}},"id":"..."}
//! reply:    {"id":"...","response":{"success":..,"message":..},"isDisposed":true}
//! ```
//!
//! A packet without `id` is fire-and-forget: the event is queued and
//! nothing is written back. With an `id`, the transport waits for the
//! event's outcome and replies on the same socket. Packets for any other
//! pattern are logged and dropped.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared_bus::IntakeSender;
use shared_types::{EventHeaders, ProcessResult, VoteConfirmedEvent, VOTE_CONFIRMED_PATTERN};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::adapters::framing::{encode_frame, FrameDecoder, FrameError};
use crate::handlers::INTERNAL_ERROR_MESSAGE;

/// Default wait for an outcome before replying with an internal error.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(60);

/// Replies queued per connection before packet tasks wait on the writer.
const REPLY_QUEUE: usize = 64;

const READ_BUFFER: usize = 8 * 1024;

/// Connection-level failures.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("framing error: {0}")]
    Frame(#[from] FrameError),
}

#[derive(Debug, Deserialize)]
struct InboundPacket {
    pattern: serde_json::Value,
    #[serde(default)]
    data: Option<PacketData>,
    #[serde(default)]
    id: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct PacketData {
    #[serde(default)]
    headers: EventHeaders,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyPacket<'a> {
    id: &'a serde_json::Value,
    response: &'a ProcessResult,
    is_disposed: bool,
}

/// TCP listener queueing `vote.confirmed` events.
pub struct TcpTransport {
    intake: IntakeSender,
    reply_timeout: Duration,
}

impl TcpTransport {
    /// Create a transport feeding `intake`.
    pub fn new(intake: IntakeSender) -> Self {
        Self {
            intake,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }

    /// Set how long a request waits for its outcome.
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// Accept connections until `shutdown` flips.
    pub async fn serve(
        self: Arc<Self>,
        listener: TcpListener,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), TransportError> {
        info!(addr = %listener.local_addr()?, "Certificate service listening");

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let transport = Arc::clone(&self);
                        tokio::spawn(async move {
                            if let Err(e) = transport.handle_connection(stream, peer).await {
                                warn!(%peer, error = %e, "Connection closed with error");
                            }
                        });
                    }
                    Err(e) => warn!(error = %e, "Failed to accept connection"),
                },
                _ = shutdown.changed() => {
                    info!("Transport shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    async fn handle_connection(
        self: Arc<Self>,
        stream: TcpStream,
        peer: SocketAddr,
    ) -> Result<(), TransportError> {
        debug!(%peer, "Client connected");
        let (mut reader, mut writer) = stream.into_split();
        let (reply_tx, mut reply_rx) = mpsc::channel::<String>(REPLY_QUEUE);

        tokio::spawn(async move {
            while let Some(frame) = reply_rx.recv().await {
                if let Err(e) = writer.write_all(frame.as_bytes()).await {
                    warn!(%peer, error = %e, "Failed to write reply");
                    break;
                }
            }
        });

        let mut decoder = FrameDecoder::new();
        let mut buf = vec![0u8; READ_BUFFER];
        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                debug!(%peer, "Client disconnected");
                return Ok(());
            }
            decoder.extend(&buf[..n]);

            while let Some(frame) = decoder.next_frame()? {
                let transport = Arc::clone(&self);
                let reply_tx = reply_tx.clone();
                tokio::spawn(async move {
                    if let Some(reply) = transport.handle_packet(&frame, peer).await {
                        // Receiver gone means the writer already failed and logged.
                        let _ = reply_tx.send(reply).await;
                    }
                });
            }
        }
    }

    /// Handle one decoded packet; returns the reply frame, if one is owed.
    async fn handle_packet(&self, raw: &str, peer: SocketAddr) -> Option<String> {
        let packet: InboundPacket = match serde_json::from_str(raw) {
            Ok(packet) => packet,
            Err(e) => {
                warn!(%peer, error = %e, "Malformed packet dropped");
                return None;
            }
        };

        if packet.pattern.as_str() != Some(VOTE_CONFIRMED_PATTERN) {
            warn!(%peer, pattern = %packet.pattern, "No handler for pattern, packet dropped");
            return None;
        }

        let headers = packet.data.map(|d| d.headers).unwrap_or_default();
        let event = VoteConfirmedEvent::new(headers);
        let correlation_id = event.correlation_id;

        let Some(id) = packet.id else {
            if self.intake.submit(event).await.is_err() {
                error!(%correlation_id, "Intake queue closed, event dropped");
            }
            return None;
        };

        let result = match self.intake.request(event).await {
            Ok(outcome) => match tokio::time::timeout(self.reply_timeout, outcome).await {
                Ok(Ok(result)) => result,
                Ok(Err(_)) => {
                    error!(%correlation_id, "Event dropped before an outcome was reported");
                    ProcessResult::failed(INTERNAL_ERROR_MESSAGE)
                }
                Err(_) => {
                    error!(
                        %correlation_id,
                        timeout = ?self.reply_timeout,
                        "No outcome before reply timeout"
                    );
                    ProcessResult::failed(INTERNAL_ERROR_MESSAGE)
                }
            },
            Err(e) => {
                error!(%correlation_id, error = %e, "Event not accepted");
                ProcessResult::failed(INTERNAL_ERROR_MESSAGE)
            }
        };

        let reply = ReplyPacket {
            id: &id,
            response: &result,
            is_disposed: true,
        };
        match serde_json::to_string(&reply) {
            Ok(json) => Some(encode_frame(&json)),
            Err(e) => {
                error!(%correlation_id, error = %e, "Failed to encode reply");
                None
            }
        }
    }
}
