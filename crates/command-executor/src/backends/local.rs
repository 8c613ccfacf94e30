//! Local process execution backend

use async_io::Timer;
use async_process::{Command as AsyncCommand, Stdio};
use async_trait::async_trait;
use futures_lite::future;
use tracing::{debug, warn};

use crate::command::Command;
use crate::error::{Error, Result};
use crate::outcome::{exit_code_of, CommandOutcome};
use crate::runner::{OutputMode, RunOptions, Runner};

/// Runner for executing processes locally
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRunner;

#[async_trait]
impl Runner for LocalRunner {
    async fn run(&self, command: &Command, options: RunOptions) -> CommandOutcome {
        let line = command.to_string();
        debug!(command = %line, ?options, "Running command");

        let mut cmd = command.prepare();
        // The child is killed if the execution future is dropped on timeout
        cmd.stdin(Stdio::null()).kill_on_drop(true);

        let finished = match options.timeout {
            Some(limit) => {
                future::or(
                    async { Some(execute(&mut cmd, options.output).await) },
                    async {
                        Timer::after(limit).await;
                        None
                    },
                )
                .await
            }
            None => Some(execute(&mut cmd, options.output).await),
        };

        match finished {
            Some(Ok(outcome)) => {
                debug!(command = %line, exit_code = outcome.exit_code, "Command finished");
                outcome
            }
            Some(Err(e)) => {
                warn!(command = %line, "Failed to run command: {}", e);
                CommandOutcome::spawn_failed(&line, &e)
            }
            None => {
                warn!(command = %line, timeout = ?options.timeout, "Command timed out");
                CommandOutcome::timed_out(&line)
            }
        }
    }
}

async fn execute(cmd: &mut AsyncCommand, mode: OutputMode) -> Result<CommandOutcome> {
    match mode {
        OutputMode::Capture => {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            let child = cmd.spawn().map_err(|e| Error::spawn_failed(e.to_string()))?;
            let output = child.output().await?;
            Ok(CommandOutcome::completed(
                exit_code_of(output.status),
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr),
            ))
        }
        OutputMode::Inherit => {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            let mut child = cmd.spawn().map_err(|e| Error::spawn_failed(e.to_string()))?;
            let status = child.status().await?;
            Ok(CommandOutcome::completed(exit_code_of(status), "", ""))
        }
    }
}
