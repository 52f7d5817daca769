//! Shared library for the media aggregation gateway.
//!
//! This crate provides functionality used by the aggregator and its binary:
//! - Configuration management
//! - Logging infrastructure
//! - Normalized result models

pub mod config;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use logging::LogConfig;
pub use models::*;
