//! # Event Handlers
//!
//! Handlers that consume queued events and drive the subsystems.

pub mod vote_confirmed;

pub use vote_confirmed::*;
