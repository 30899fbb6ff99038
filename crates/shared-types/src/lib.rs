//! # Shared Types Crate
//!
//! Types that cross subsystem boundaries: the inbound `vote.confirmed` event,
//! the payload recovered from its envelope, and the outcome of one pipeline
//! run.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Secrets stay opaque**: header values are redacted from `Debug` output.

pub mod entities;
pub mod event;

pub use entities::*;
pub use event::*;
