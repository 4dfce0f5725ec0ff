//! Shared library for the MediaWiki client workspace.
//!
//! This crate provides common functionality used by the client crate and its
//! command-line binary:
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod logging;

// Re-export commonly used types
pub use config::{Config, MediaWikiConfig};
pub use logging::LogConfig;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
