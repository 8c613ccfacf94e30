//! Hands relay configuration to the running service
//!
//! The relay service reads `relays.json` from a volume shared with the host
//! and only picks up changes when its process starts. Injection therefore
//! means: write the file, restart the container, wait for it.

use harness_config::{RelayConfig, RelayRule};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{HarnessError, Result};
use crate::lifecycle::Lifecycle;
use crate::readiness::{ReadyState, Readiness};

/// Relay file location, relative to the compose project
pub const DEFAULT_RELAYS_FILE: &str = "tailscale/relays.json";

/// Relay used by the default scenario: listener 8089 to the `whoami` echo server
pub fn default_relay() -> RelayRule {
    RelayRule::new("test-relay", 8089, "whoami-test", 80)
}

/// Writes relay configuration onto the shared volume
#[derive(Debug, Clone)]
pub struct ConfigInjector {
    relays_file: PathBuf,
}

impl ConfigInjector {
    /// Create an injector writing to `relays_file`
    pub fn new(relays_file: impl Into<PathBuf>) -> Self {
        Self {
            relays_file: relays_file.into(),
        }
    }

    /// Path of the relay file
    pub fn relays_file(&self) -> &Path {
        &self.relays_file
    }

    /// Make sure the volume directory exists before compose mounts it.
    ///
    /// Failure is only logged; a missing directory makes the later write fail.
    pub async fn prepare_volume(&self) {
        let Some(dir) = self.relays_file.parent().filter(|d| !d.as_os_str().is_empty()) else {
            return;
        };

        if let Err(e) = async_fs::create_dir_all(dir).await {
            warn!("Could not create volume directory {}: {}", dir.display(), e);
        }
    }

    /// Serialize `rules` and write them to the relay file
    pub async fn write(&self, rules: &[RelayRule]) -> Result<RelayConfig> {
        let config = RelayConfig::new(rules.to_vec()).map_err(HarnessError::InvalidRelayConfig)?;
        let json = config
            .to_json_pretty()
            .map_err(HarnessError::InvalidRelayConfig)?;

        async_fs::write(&self.relays_file, json)
            .await
            .map_err(|source| HarnessError::ConfigWrite {
                path: self.relays_file.clone(),
                source,
            })?;

        info!(
            "Created {} with {} relay(s)",
            self.relays_file.display(),
            config.relays.len()
        );
        Ok(config)
    }

    /// Write `rules`, restart the relay container and wait for it
    pub async fn inject(
        &self,
        rules: &[RelayRule],
        lifecycle: &Lifecycle,
        readiness: &Readiness,
    ) -> Result<ReadyState> {
        self.write(rules).await?;
        lifecycle.restart_service().await;
        Ok(lifecycle.await_ready(readiness).await)
    }
}
