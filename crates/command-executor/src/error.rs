//! Error types for command execution

use thiserror::Error;

/// Errors raised while driving a child process.
///
/// These never escape [`Runner::run`](crate::Runner::run); the local backend
/// folds them into a [`CommandOutcome`](crate::CommandOutcome).
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to spawn a process
    #[error("failed to spawn process: {reason}")]
    SpawnFailed {
        /// The reason for the spawn failure
        reason: String,
    },

    /// Process did not finish in time
    #[error("timeout expired for command: {command}")]
    Timeout {
        /// The command line that timed out
        command: String,
    },

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a spawn failed error
    pub fn spawn_failed(reason: impl Into<String>) -> Self {
        Self::SpawnFailed {
            reason: reason.into(),
        }
    }

    /// Create a timeout error for the given command line
    pub fn timeout(command: impl Into<String>) -> Self {
        Self::Timeout {
            command: command.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
