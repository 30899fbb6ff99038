//! # Service Container
//!
//! Configuration and the wired subsystem instances.
//!
//! - Key material is loaded before anything else is built
//! - Subsystems are reached only through their inbound ports

pub mod config;
pub mod services;

pub use config::{ConfigError, ServiceConfig};
pub use services::{ContainerError, ServiceContainer};
