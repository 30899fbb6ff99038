//! # Certificate Runtime Library
//!
//! This library exposes the internal modules of the certificate service for
//! testing. The main entry point is the `main.rs` binary.
//!
//! ## Architectural Patterns
//!
//! - **EDA (Event-Driven Architecture)**: the transport queues events for the
//!   handler, which publishes every outcome on the bus
//! - **Hexagonal Architecture**: subsystems are reached through their inbound
//!   ports, adapters implement the outbound ones

#![allow(clippy::type_complexity)]

pub mod adapters;
pub mod container;
pub mod handlers;
pub mod logging;

pub use container::{ConfigError, ContainerError, ServiceConfig, ServiceContainer};
pub use handlers::{EventOutcome, VoteConfirmedHandler, INTERNAL_ERROR_MESSAGE};
