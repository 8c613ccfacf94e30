//! Network probes against the running relay container
//!
//! Every probe fetches a URL with `wget` from inside the container's network
//! namespace, so the checks see exactly what the relay service sees. Probes
//! run one at a time in list order; each gets a single attempt and its
//! failure never stops the ones after it.

use command_executor::{Command, CommandOutcome, RunOptions, Runner};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-probe timeout used when none is configured
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// What a probe requires of the response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// The fetch exits with code 0
    Reachable,
    /// The fetch exits with code 0 and the body contains the marker
    BodyContains(String),
}

/// A single check, defined statically
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeCase {
    /// URL fetched from inside the container
    pub target: String,
    /// Human readable label for the report
    pub description: String,
    /// Success criterion
    pub expectation: Expectation,
    /// Whether certificate verification is skipped
    pub insecure: bool,
}

impl ProbeCase {
    /// A probe that only needs the endpoint to answer.
    ///
    /// Certificate verification is disabled: the test environment uses
    /// self-signed certificates.
    pub fn reachable(target: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            description: description.into(),
            expectation: Expectation::Reachable,
            insecure: true,
        }
    }

    /// Probe for a relay listening on `listen_port`.
    ///
    /// The upstream echoes request headers, so a correctly forwarded request
    /// carries the listener's own address in its `Host:` header.
    pub fn relay(listen_port: u16) -> Self {
        Self {
            target: format!("http://127.0.0.1:{listen_port}"),
            description: format!("Socat Relay / {listen_port}"),
            expectation: Expectation::BodyContains(format!("Host: 127.0.0.1:{listen_port}")),
            insecure: false,
        }
    }
}

/// The fixed endpoint checks, in execution order
pub fn standard_cases() -> Vec<ProbeCase> {
    vec![
        ProbeCase::reachable("http://127.0.0.1:8080", "Health / 8080"),
        ProbeCase::reachable("http://127.0.0.1:8081", "Health / 8081"),
        ProbeCase::reachable("https://127.0.0.1:8443", "TLS / 8443"),
        ProbeCase::reachable("http://127.0.0.1:9002/healthz", "Health endpoint / 9002"),
        ProbeCase::reachable("http://127.0.0.1:9002/metrics", "Metrics endpoint / 9002"),
    ]
}

/// Pass or fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The expectation held
    Success,
    /// The expectation did not hold
    Failure,
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Success => write!(f, "✅ success"),
            ProbeOutcome::Failure => write!(f, "❌ fail"),
        }
    }
}

/// Why a probe failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    /// The fetch itself failed
    Transport {
        /// Exit code of the fetch
        exit_code: i32,
        /// Stderr of the fetch
        stderr: String,
    },
    /// The fetch did not finish in time
    TimedOut,
    /// The fetch succeeded but the body lacked the marker
    MarkerMissing {
        /// The text that was expected
        marker: String,
    },
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeFailure::Transport { exit_code, stderr } => {
                write!(f, "request failed with exit code {}", exit_code)?;
                if !stderr.trim().is_empty() {
                    write!(f, ": {}", stderr.trim())?;
                }
                Ok(())
            }
            ProbeFailure::TimedOut => write!(f, "request timed out"),
            ProbeFailure::MarkerMissing { marker } => {
                write!(f, "response did not contain '{}'", marker)
            }
        }
    }
}

/// Result of one probe execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// Copied from the case
    pub description: String,
    /// Copied from the case
    pub target: String,
    /// Pass or fail
    pub outcome: ProbeOutcome,
    /// Set exactly when the outcome is a failure
    pub failure: Option<ProbeFailure>,
}

impl ProbeResult {
    /// Whether the probe passed
    pub fn passed(&self) -> bool {
        self.outcome == ProbeOutcome::Success
    }
}

/// Judge a fetch outcome against a case
pub fn evaluate(case: &ProbeCase, outcome: &CommandOutcome) -> ProbeResult {
    let failure = if outcome.timed_out {
        Some(ProbeFailure::TimedOut)
    } else if outcome.exit_code != 0 {
        Some(ProbeFailure::Transport {
            exit_code: outcome.exit_code,
            stderr: outcome.stderr.clone(),
        })
    } else {
        match &case.expectation {
            Expectation::Reachable => None,
            Expectation::BodyContains(marker) if outcome.stdout.contains(marker.as_str()) => None,
            Expectation::BodyContains(marker) => Some(ProbeFailure::MarkerMissing {
                marker: marker.clone(),
            }),
        }
    };

    ProbeResult {
        description: case.description.clone(),
        target: case.target.clone(),
        outcome: if failure.is_none() {
            ProbeOutcome::Success
        } else {
            ProbeOutcome::Failure
        },
        failure,
    }
}

/// `wget` of `url` executed inside `container`
pub fn fetch_command(container: &str, url: &str, insecure: bool) -> Command {
    let mut cmd = Command::new("docker");
    cmd.args(["exec", container, "wget", "-qO-"]);
    if insecure {
        cmd.arg("--no-check-certificate");
    }
    cmd.arg(url);
    cmd
}

/// Executes probes inside the relay container
pub struct ProbeSuite {
    runner: Arc<dyn Runner>,
    container: String,
    timeout: Duration,
}

impl ProbeSuite {
    /// Create a suite probing from inside `container`
    pub fn new(runner: Arc<dyn Runner>, container: impl Into<String>, timeout: Duration) -> Self {
        Self {
            runner,
            container: container.into(),
            timeout,
        }
    }

    /// Run a single probe
    pub async fn run_one(&self, case: &ProbeCase) -> ProbeResult {
        let cmd = fetch_command(&self.container, &case.target, case.insecure);
        debug!("Probing {} ({})", case.target, case.description);

        let outcome = self
            .runner
            .run(&cmd, RunOptions::captured().with_timeout(self.timeout))
            .await;
        let result = evaluate(case, &outcome);

        match &result.failure {
            None => info!("{}: {}", case.description, result.outcome),
            Some(ProbeFailure::MarkerMissing { marker }) => warn!(
                "{}: reached {} but the response lacks '{}'; the relay forwarded to the wrong target. Body: '{}'",
                case.description,
                case.target,
                marker,
                outcome.stdout.trim()
            ),
            Some(failure) => warn!("{}: {}", case.description, failure),
        }

        result
    }

    /// Run every case in order; one result per case, same order
    pub async fn run_all(&self, cases: &[ProbeCase]) -> Vec<ProbeResult> {
        let mut results = Vec::with_capacity(cases.len());
        for case in cases {
            results.push(self.run_one(case).await);
        }
        results
    }
}
