//! Structured result of a single command invocation

use crate::error::Error;

/// Exit code reported when a command exceeds its timeout.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Exit code reported when a command could not be started at all.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// What happened when a command ran.
///
/// Every field is always populated. Output that was not captured, or that
/// was lost to a timeout, is an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Process exit code, or one of the sentinels in this module
    pub exit_code: i32,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error, or a description of what went wrong
    pub stderr: String,
    /// Whether the command was killed for exceeding its timeout
    pub timed_out: bool,
}

impl CommandOutcome {
    /// Outcome of a process that ran to completion
    pub fn completed(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            timed_out: false,
        }
    }

    /// Outcome of a command that exceeded its timeout
    pub fn timed_out(command: &str) -> Self {
        Self {
            exit_code: TIMEOUT_EXIT_CODE,
            stdout: String::new(),
            stderr: Error::timeout(command).to_string(),
            timed_out: true,
        }
    }

    /// Outcome of a command whose process could not be started
    pub fn spawn_failed(command: &str, error: &Error) -> Self {
        Self {
            exit_code: SPAWN_FAILURE_EXIT_CODE,
            stdout: String::new(),
            stderr: format!("{command}: {error}"),
            timed_out: false,
        }
    }

    /// Returns true if the process exited with code 0
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}

/// Map a process exit status to a single integer code.
///
/// Processes terminated by a signal report `128 + signal`, as shells do.
pub(crate) fn exit_code_of(status: std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}
