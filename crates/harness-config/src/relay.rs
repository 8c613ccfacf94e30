//! Relay configuration document
//!
//! The relay service watches a `relays.json` file on a shared volume:
//!
//! ```json
//! {
//!   "relays": [
//!     {
//!       "id": "test-relay",
//!       "listen_port": 8089,
//!       "target_host": "whoami-test",
//!       "target_port": 80,
//!       "enabled": true,
//!       "autostart": true
//!     }
//!   ]
//! }
//! ```

use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A listener that forwards inbound connections to a fixed upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRule {
    /// Identifier, unique within a [`RelayConfig`]
    pub id: String,
    /// Port the relay listens on inside the container
    pub listen_port: u16,
    /// Upstream host name
    pub target_host: String,
    /// Upstream port
    pub target_port: u16,
    /// Whether the relay may run at all
    pub enabled: bool,
    /// Whether the service starts the relay on boot
    pub autostart: bool,
}

impl RelayRule {
    /// An enabled, autostarting relay from `listen_port` to `target_host:target_port`
    pub fn new(
        id: impl Into<String>,
        listen_port: u16,
        target_host: impl Into<String>,
        target_port: u16,
    ) -> Self {
        Self {
            id: id.into(),
            listen_port,
            target_host: target_host.into(),
            target_port,
            enabled: true,
            autostart: true,
        }
    }
}

/// Ordered set of relays, as read by the relay service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Relays in file order
    pub relays: Vec<RelayRule>,
}

impl RelayConfig {
    /// Build a validated configuration
    pub fn new(relays: Vec<RelayRule>) -> Result<Self> {
        let config = Self { relays };
        config.validate()?;
        Ok(config)
    }

    /// Check ports, ids and listeners
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        let mut listeners = HashSet::new();

        for relay in &self.relays {
            if relay.id.is_empty() {
                return Err(ConfigError::ValidationError(
                    "relay id must not be empty".to_string(),
                ));
            }
            if !ids.insert(relay.id.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate relay id '{}'",
                    relay.id
                )));
            }
            if relay.listen_port == 0 || relay.target_port == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "relay '{}' uses port 0",
                    relay.id
                )));
            }
            if relay.target_host.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "relay '{}' has no target host",
                    relay.id
                )));
            }
            if !listeners.insert(relay.listen_port) {
                return Err(ConfigError::ValidationError(format!(
                    "relay '{}' listens on port {} which is already taken",
                    relay.id, relay.listen_port
                )));
            }
        }

        Ok(())
    }

    /// Serialize for the relay service: two-space indentation, fields in
    /// declaration order, trailing newline
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Parse and validate a configuration document
    pub fn parse_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}
