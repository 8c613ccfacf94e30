//! # Harness Configuration
//!
//! Deployment parameters and the relay configuration document for the
//! tailrelay test harness.
//!
//! Two things live here:
//! - [`HarnessEnv`]: host, domain and compose file, resolved once from the
//!   process environment (and an optional `.env` file) with defaults.
//! - [`RelayConfig`] / [`RelayRule`]: the `relays.json` document the relay
//!   service reads from its mounted volume.

#![warn(missing_docs)]

use thiserror::Error;

pub mod relay;
pub mod resolver;

pub use relay::{RelayConfig, RelayRule};
pub use resolver::HarnessEnv;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to serialize or parse JSON
    #[error("Failed to process JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
