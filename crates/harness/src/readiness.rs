//! Waiting for the relay container to come up
//!
//! Two strategies: a fixed grace period, or bounded polling of the health
//! endpoint from inside the container with exponential backoff. Neither is
//! fatal. Running out of attempts is reported as [`ReadyState::TimedOut`] and
//! the probes record whatever is still broken.

use command_executor::{RunOptions, Runner};
use std::time::Duration;
use tracing::debug;

use crate::probe::fetch_command;

/// Health endpoint served by the relay container
pub const HEALTH_URL: &str = "http://127.0.0.1:9002/healthz";

/// How to wait after a lifecycle transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// Sleep unconditionally
    Grace(Duration),
    /// Poll the health endpoint until it answers
    Poll(PollPolicy),
}

/// Bounded polling with exponential backoff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Endpoint fetched from inside the container
    pub url: String,
    /// Maximum number of health checks
    pub attempts: u32,
    /// Delay after the first failed check
    pub initial_delay: Duration,
    /// Upper bound for the delay between checks
    pub max_delay: Duration,
    /// Timeout for each individual check
    pub attempt_timeout: Duration,
}

impl PollPolicy {
    /// Delay to sleep after failed attempt number `attempt` (zero-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(16);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// What a wait ended with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadyState {
    /// The health endpoint answered after this many checks
    Ready {
        /// Checks performed, including the successful one
        attempts: u32,
    },
    /// A grace period elapsed; readiness is unknown
    Waited(Duration),
    /// The health endpoint never answered
    TimedOut {
        /// Checks performed
        attempts: u32,
    },
}

impl Readiness {
    /// Fixed three second delay after `compose up`
    pub fn startup_grace() -> Self {
        Self::Grace(Duration::from_secs(3))
    }

    /// Fixed five second delay after a container restart
    pub fn restart_grace() -> Self {
        Self::Grace(Duration::from_secs(5))
    }

    /// Default polling after `compose up`
    pub fn startup_poll() -> Self {
        Self::Poll(PollPolicy {
            url: HEALTH_URL.to_string(),
            attempts: 10,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(4),
            attempt_timeout: Duration::from_secs(5),
        })
    }

    /// Default polling after a restart, which re-initializes every relay
    pub fn restart_poll() -> Self {
        Self::Poll(PollPolicy {
            url: HEALTH_URL.to_string(),
            attempts: 15,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(4),
            attempt_timeout: Duration::from_secs(5),
        })
    }

    /// Wait for `container` according to this strategy
    pub async fn wait(&self, runner: &dyn Runner, container: &str) -> ReadyState {
        match self {
            Readiness::Grace(period) => {
                debug!("Sleeping {:?} for {} to settle", period, container);
                smol::Timer::after(*period).await;
                ReadyState::Waited(*period)
            }
            Readiness::Poll(policy) => {
                let check = fetch_command(container, &policy.url, false);
                let options = RunOptions::captured().with_timeout(policy.attempt_timeout);

                for attempt in 0..policy.attempts {
                    let outcome = runner.run(&check, options).await;
                    if outcome.success() {
                        return ReadyState::Ready {
                            attempts: attempt + 1,
                        };
                    }

                    debug!(
                        "Health check {}/{} for {} failed (exit code {})",
                        attempt + 1,
                        policy.attempts,
                        container,
                        outcome.exit_code
                    );

                    if attempt + 1 < policy.attempts {
                        smol::Timer::after(policy.delay_after(attempt)).await;
                    }
                }

                ReadyState::TimedOut {
                    attempts: policy.attempts,
                }
            }
        }
    }
}
