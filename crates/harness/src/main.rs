use anyhow::Result;
use clap::Parser;
use command_executor::LocalRunner;
use harness::injector::DEFAULT_RELAYS_FILE;
use harness::lifecycle::{DEFAULT_CONTAINER, DEFAULT_IMAGE};
use harness::readiness::Readiness;
use harness::{RunController, RunSettings};
use harness_config::{HarnessEnv, RelayRule};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

#[derive(Parser)]
#[command(name = "tailrelay-harness")]
#[command(about = "Build, start and probe the tailrelay container end to end")]
#[command(version)]
struct Cli {
    /// Reuse the existing image instead of building it
    #[arg(long)]
    skip_build: bool,

    /// Compose service and container name of the relay
    #[arg(long, default_value = DEFAULT_CONTAINER)]
    container: String,

    /// Image tag to build
    #[arg(long, default_value = DEFAULT_IMAGE)]
    image: String,

    /// Build context directory
    #[arg(long, default_value = ".")]
    build_context: PathBuf,

    /// Relay file on the volume shared with the container
    #[arg(long, default_value = DEFAULT_RELAYS_FILE)]
    relays_file: PathBuf,

    /// Port the test relay listens on
    #[arg(long, default_value_t = 8089)]
    relay_port: u16,

    /// Upstream host the test relay forwards to
    #[arg(long, default_value = "whoami-test")]
    relay_target_host: String,

    /// Upstream port the test relay forwards to
    #[arg(long, default_value_t = 80)]
    relay_target_port: u16,

    /// Sleep fixed grace periods instead of polling the health endpoint
    #[arg(long)]
    fixed_grace: bool,

    /// Per-probe timeout in seconds
    #[arg(long, default_value_t = 10)]
    probe_timeout: u64,

    /// Exit with code 2 when any probe fails
    #[arg(long)]
    strict: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn settings(&self, env: &HarnessEnv) -> RunSettings {
        let mut settings = RunSettings::new(env);
        settings.lifecycle.container = self.container.clone();
        settings.lifecycle.image = self.image.clone();
        settings.lifecycle.build_context = self.build_context.clone();
        settings.relays_file = self.relays_file.clone();
        settings.relays = vec![RelayRule::new(
            "test-relay",
            self.relay_port,
            &self.relay_target_host,
            self.relay_target_port,
        )];
        settings.skip_build = self.skip_build;
        settings.probe_timeout = Duration::from_secs(self.probe_timeout);
        if self.fixed_grace {
            settings.startup = Readiness::startup_grace();
            settings.restart = Readiness::restart_grace();
        }
        settings
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = harness::logging::init(cli.verbose) {
        eprintln!("{:#}", e);
    }

    match smol::block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            error!("❌ {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let env = HarnessEnv::from_process_env();
    let settings = cli.settings(&env);
    let controller = RunController::new(Arc::new(LocalRunner), env, settings);

    let report = controller.run().await?;

    if cli.strict && !report.all_passed() {
        error!("{} probe(s) failed", report.failures());
        return Ok(ExitCode::from(2));
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let cli = Cli::try_parse_from(["tailrelay-harness"]).unwrap();
        let settings = cli.settings(&HarnessEnv::default());

        assert_eq!(settings.lifecycle.container, "tailrelay-test");
        assert_eq!(settings.relays_file, PathBuf::from("tailscale/relays.json"));
        assert_eq!(settings.relays[0].listen_port, 8089);
        assert_eq!(settings.relays[0].target_host, "whoami-test");
        assert_eq!(settings.startup, Readiness::startup_poll());
        assert!(!settings.skip_build);
    }

    #[test]
    fn test_fixed_grace_and_relay_overrides() {
        let cli = Cli::try_parse_from([
            "tailrelay-harness",
            "--fixed-grace",
            "--relay-port",
            "9100",
            "--relay-target-host",
            "backend",
            "--skip-build",
        ])
        .unwrap();
        let settings = cli.settings(&HarnessEnv::default());

        assert_eq!(settings.startup, Readiness::startup_grace());
        assert_eq!(settings.restart, Readiness::restart_grace());
        assert_eq!(settings.relays[0].listen_port, 9100);
        assert_eq!(settings.relays[0].target_host, "backend");
        assert!(settings.skip_build);
    }
}
