//! # Vote Certificate Service Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Keys, sealed envelopes, recording mailers
//! │
//! ├── exploits/         # Attack simulations
//! │   ├── envelope_tampering.rs
//! │   ├── credential_guessing.rs
//! │   ├── key_substitution.rs
//! │   └── redelivery_flood.rs
//! │
//! └── integration/      # Cross-subsystem flows
//!     ├── flows.rs      # Intake → issuance through the handler
//!     └── transport.rs  # Gateway frames over TCP
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p cs-tests
//!
//! # By category
//! cargo test -p cs-tests integration::
//! cargo test -p cs-tests exploits::
//!
//! # Benchmarks
//! cargo bench -p cs-tests
//! ```

pub mod exploits;
pub mod fixtures;
pub mod integration;
