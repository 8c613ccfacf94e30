//! Container environment lifecycle: down, build, up, restart
//!
//! Every operation shells out to the docker CLI through a [`Runner`]. Only
//! `build_image` and `start` can fail the run; everything else logs a
//! warning and carries on.

use command_executor::{Command, RunOptions, Runner};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{HarnessError, Result};
use crate::readiness::{ReadyState, Readiness};

/// Image tag built and started by the test environment
pub const DEFAULT_IMAGE: &str = "sudocarlos/tailrelay:dev";

/// Compose service and container name of the relay under test
pub const DEFAULT_CONTAINER: &str = "tailrelay-test";

/// Number of log lines shown by [`Lifecycle::diagnostics`]
const LOG_TAIL_LINES: &str = "10";

/// Where and what to build and run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleSettings {
    /// Compose file describing the environment
    pub compose_file: PathBuf,
    /// Image tag produced by the build
    pub image: String,
    /// Build context directory
    pub build_context: PathBuf,
    /// Compose service name, also used as the container name
    pub container: String,
}

impl LifecycleSettings {
    /// Defaults for the given compose file
    pub fn new(compose_file: impl Into<PathBuf>) -> Self {
        Self {
            compose_file: compose_file.into(),
            image: DEFAULT_IMAGE.to_string(),
            build_context: PathBuf::from("."),
            container: DEFAULT_CONTAINER.to_string(),
        }
    }
}

/// Drives the compose environment
pub struct Lifecycle {
    runner: Arc<dyn Runner>,
    settings: LifecycleSettings,
}

impl Lifecycle {
    /// Create a controller using `runner` for every docker invocation
    pub fn new(runner: Arc<dyn Runner>, settings: LifecycleSettings) -> Self {
        Self { runner, settings }
    }

    fn compose(&self) -> Command {
        let mut cmd = Command::new("docker");
        cmd.arg("compose").arg("-f").arg(&self.settings.compose_file);
        cmd
    }

    /// `compose down`. Never fails; the environment may not exist yet.
    pub async fn teardown(&self) {
        info!("Shutting down containers");
        let mut cmd = self.compose();
        cmd.arg("down");

        let outcome = self.runner.run(&cmd, RunOptions::captured()).await;
        if !outcome.success() {
            warn!(
                "docker compose down failed (exit code {}), continuing anyway: {}",
                outcome.exit_code,
                outcome.stderr.trim()
            );
        }
    }

    /// Build the relay image
    pub async fn build_image(&self) -> Result<()> {
        info!("Building image {}", self.settings.image);
        let mut cmd = Command::new("docker");
        cmd.args(["buildx", "build", "-t"])
            .arg(&self.settings.image)
            .arg("--load")
            .arg(&self.settings.build_context);

        let outcome = self.runner.run(&cmd, RunOptions::captured()).await;
        if !outcome.success() {
            return Err(HarnessError::BuildFailed {
                stderr: outcome.stderr,
            });
        }

        debug!("Build output:\n{}", outcome.stdout.trim());
        Ok(())
    }

    /// `compose up -d`
    pub async fn start(&self) -> Result<()> {
        info!("Starting containers");
        let mut cmd = self.compose();
        cmd.args(["up", "-d"]);

        let outcome = self.runner.run(&cmd, RunOptions::captured()).await;
        if !outcome.success() {
            return Err(HarnessError::StartFailed {
                stderr: outcome.stderr,
            });
        }

        Ok(())
    }

    /// Restart the relay container so it re-reads its configuration
    pub async fn restart_service(&self) {
        info!("Restarting {} to apply config", self.settings.container);
        let cmd = Command::builder("docker")
            .arg("restart")
            .arg(&self.settings.container)
            .build();

        let outcome = self.runner.run(&cmd, RunOptions::inherited()).await;
        if !outcome.success() {
            warn!(
                "docker restart {} failed with exit code {}",
                self.settings.container, outcome.exit_code
            );
        }
    }

    /// Wait for the relay container using `readiness`
    pub async fn await_ready(&self, readiness: &Readiness) -> ReadyState {
        info!("Waiting for {} to become ready", self.settings.container);
        let state = readiness.wait(&*self.runner, &self.settings.container).await;

        match &state {
            ReadyState::Ready { attempts } => {
                info!("{} is ready after {} check(s)", self.settings.container, attempts)
            }
            ReadyState::Waited(period) => debug!("Waited {:?}", period),
            ReadyState::TimedOut { attempts } => warn!(
                "{} did not report healthy after {} check(s), probing anyway",
                self.settings.container, attempts
            ),
        }

        state
    }

    /// Log tail and listening sockets. Advisory only; failures are logged.
    pub async fn diagnostics(&self) {
        let mut logs = self.compose();
        logs.args(["logs", "--tail", LOG_TAIL_LINES])
            .arg(&self.settings.container);

        let outcome = self.runner.run(&logs, RunOptions::captured()).await;
        if outcome.success() {
            info!(
                "Container logs tail (last {} lines):\n{}",
                LOG_TAIL_LINES,
                outcome.stdout.trim_end()
            );
        } else {
            warn!("Could not read container logs: {}", outcome.stderr.trim());
        }

        let sockets = Command::builder("docker")
            .arg("exec")
            .arg(&self.settings.container)
            .args(["netstat", "-tuln"])
            .build();

        let outcome = self.runner.run(&sockets, RunOptions::captured()).await;
        if outcome.success() {
            info!("Listening sockets:\n{}", listening_lines(&outcome.stdout));
        } else {
            warn!("Could not list listening sockets: {}", outcome.stderr.trim());
        }
    }
}

/// Lines of `netstat` output that describe listening sockets
fn listening_lines(netstat: &str) -> String {
    netstat
        .lines()
        .filter(|line| line.contains("LISTEN"))
        .collect::<Vec<_>>()
        .join("\n")
}
