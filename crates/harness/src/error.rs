//! Fatal harness errors
//!
//! Anything in here ends the run with a non-zero exit. Failures that the run
//! survives (teardown, diagnostics, probe failures) are logged or recorded in
//! the report instead.

use std::path::PathBuf;
use thiserror::Error;

/// A failure that aborts the run
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Building the image failed
    #[error("Build failed:\n{stderr}")]
    BuildFailed {
        /// Captured stderr of the build
        stderr: String,
    },

    /// `compose up` failed
    #[error("docker compose up failed:\n{stderr}")]
    StartFailed {
        /// Captured stderr of `compose up`
        stderr: String,
    },

    /// The relay rules do not form a valid configuration
    #[error("Invalid relay configuration: {0}")]
    InvalidRelayConfig(#[source] harness_config::ConfigError),

    /// The relay file could not be written to the shared volume
    #[error("Failed to write relays file {}: {source}", path.display())]
    ConfigWrite {
        /// Destination of the relay file
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
}

/// Result type for harness stages
pub type Result<T> = std::result::Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_failure_surfaces_stderr() {
        let err = HarnessError::BuildFailed {
            stderr: "no such file".to_string(),
        };
        assert_eq!(err.to_string(), "Build failed:\nno such file");
    }

    #[test]
    fn test_config_write_names_path() {
        let err = HarnessError::ConfigWrite {
            path: PathBuf::from("tailscale/relays.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("tailscale/relays.json"));
        assert!(msg.contains("permission denied"));
    }
}
