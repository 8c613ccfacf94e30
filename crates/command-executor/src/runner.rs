//! Runner trait for executing commands to completion

use crate::command::Command;
use crate::outcome::CommandOutcome;
use async_trait::async_trait;
use std::time::Duration;

/// Where a command's output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Collect stdout and stderr into the outcome
    Capture,
    /// Let the child write to the parent's stdout and stderr
    Inherit,
}

/// Per-invocation options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// How output is handled
    pub output: OutputMode,
    /// Kill the command and report a timeout after this long
    pub timeout: Option<Duration>,
}

impl RunOptions {
    /// Capture output, no timeout
    pub fn captured() -> Self {
        Self {
            output: OutputMode::Capture,
            timeout: None,
        }
    }

    /// Inherit the parent's output streams, no timeout
    pub fn inherited() -> Self {
        Self {
            output: OutputMode::Inherit,
            timeout: None,
        }
    }

    /// Bound the invocation by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::captured()
    }
}

/// Something that can run a command to completion.
///
/// Implementations never fail: a non-zero exit, a command that cannot be
/// spawned and a timeout all come back as a [`CommandOutcome`]. Retrying is
/// left to the caller.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Run `command` and wait for it to finish
    async fn run(&self, command: &Command, options: RunOptions) -> CommandOutcome;
}
