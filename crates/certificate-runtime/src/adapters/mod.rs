//! # Adapter Implementations
//!
//! Inbound adapters connecting the gateway to the intake queue.
//!
//! ```text
//! gateway ──TCP──→ [framing] ──→ [TcpTransport] ──VoteConfirmedEvent──→ Intake Queue
//!         ←─reply─────────────── [TcpTransport] ←──────oneshot────────────┘
//! ```

pub mod framing;
pub mod tcp_transport;

pub use framing::{encode_frame, FrameDecoder, FrameError, MAX_FRAME_UNITS};
pub use tcp_transport::{TcpTransport, TransportError, DEFAULT_REPLY_TIMEOUT};
