//! Top-level sequencing of a test run
//!
//! ```text
//! down -> build -> up -> wait -> diagnostics -> write relays.json
//!      -> restart -> wait -> probes -> report -> down
//! ```
//!
//! Probe failures are data and always reach the report. Fatal errors end the
//! run early; once `compose up` has been attempted the environment is torn
//! down before the error is returned.

use command_executor::Runner;
use harness_config::{HarnessEnv, RelayRule};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::Result;
use crate::injector::{default_relay, ConfigInjector, DEFAULT_RELAYS_FILE};
use crate::lifecycle::{Lifecycle, LifecycleSettings};
use crate::probe::{standard_cases, ProbeCase, ProbeResult, ProbeSuite, DEFAULT_PROBE_TIMEOUT};
use crate::readiness::Readiness;
use crate::report;

/// Everything a run needs besides the environment
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Docker-side settings
    pub lifecycle: LifecycleSettings,
    /// Relay file on the shared volume
    pub relays_file: PathBuf,
    /// Relays written before probing; each enabled one gets a probe
    pub relays: Vec<RelayRule>,
    /// Reuse an existing image instead of building
    pub skip_build: bool,
    /// Wait after `compose up`
    pub startup: Readiness,
    /// Wait after the config-triggered restart
    pub restart: Readiness,
    /// Timeout of each probe
    pub probe_timeout: Duration,
}

impl RunSettings {
    /// Default scenario for `env`
    pub fn new(env: &HarnessEnv) -> Self {
        Self {
            lifecycle: LifecycleSettings::new(&env.compose_file),
            relays_file: PathBuf::from(DEFAULT_RELAYS_FILE),
            relays: vec![default_relay()],
            skip_build: false,
            startup: Readiness::startup_poll(),
            restart: Readiness::restart_poll(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Standard probes followed by one probe per enabled relay
    pub fn probe_cases(&self) -> Vec<ProbeCase> {
        let mut cases = standard_cases();
        cases.extend(
            self.relays
                .iter()
                .filter(|relay| relay.enabled)
                .map(|relay| ProbeCase::relay(relay.listen_port)),
        );
        cases
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// One result per probe, in execution order
    pub results: Vec<ProbeResult>,
    /// Rendered table
    pub table: String,
}

impl RunReport {
    /// Number of failed probes
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| !r.passed()).count()
    }

    /// Whether every probe passed
    pub fn all_passed(&self) -> bool {
        self.failures() == 0
    }
}

/// Owns the resolved configuration and the stage components
pub struct RunController {
    env: HarnessEnv,
    settings: RunSettings,
    lifecycle: Lifecycle,
    injector: ConfigInjector,
    suite: ProbeSuite,
}

impl RunController {
    /// Wire up the stages around `runner`
    pub fn new(runner: Arc<dyn Runner>, env: HarnessEnv, settings: RunSettings) -> Self {
        let lifecycle = Lifecycle::new(runner.clone(), settings.lifecycle.clone());
        let injector = ConfigInjector::new(&settings.relays_file);
        let suite = ProbeSuite::new(
            runner,
            settings.lifecycle.container.clone(),
            settings.probe_timeout,
        );

        Self {
            env,
            settings,
            lifecycle,
            injector,
            suite,
        }
    }

    /// Execute the whole run
    pub async fn run(&self) -> Result<RunReport> {
        info!(
            "Testing {} with {}",
            self.env.fqdn(),
            self.settings.lifecycle.compose_file.display()
        );

        // Clean start
        self.lifecycle.teardown().await;
        self.injector.prepare_volume().await;

        if self.settings.skip_build {
            info!("Skipping image build");
        } else {
            self.lifecycle.build_image().await?;
        }

        // From `compose up` on, the environment may exist and must be released
        let report = match self.exercise().await {
            Ok(report) => report,
            Err(e) => {
                warn!("Aborting run: {}", e);
                self.lifecycle.teardown().await;
                return Err(e);
            }
        };

        self.lifecycle.teardown().await;
        info!("All done");
        Ok(report)
    }

    async fn exercise(&self) -> Result<RunReport> {
        self.lifecycle.start().await?;
        self.lifecycle.await_ready(&self.settings.startup).await;
        self.lifecycle.diagnostics().await;

        self.injector
            .inject(&self.settings.relays, &self.lifecycle, &self.settings.restart)
            .await?;

        let results = self.suite.run_all(&self.settings.probe_cases()).await;
        let table = report::render(&results);
        println!("\nProbe results for {}:\n{}", self.env.fqdn(), table);

        Ok(RunReport { results, table })
    }
}
