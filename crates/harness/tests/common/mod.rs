//! Shared fixtures for harness integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use command_executor::{Command, CommandOutcome, RunOptions, Runner};
use harness::readiness::Readiness;
use harness::RunSettings;
use harness_config::HarnessEnv;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

/// Fragment identifying the relay probe
pub const RELAY_PROBE: &str = "wget -qO- http://127.0.0.1:8089";

/// Body returned by the whoami upstream when the relay forwards correctly
pub const RELAYED_BODY: &str =
    "Hostname: whoami\nIP: 172.18.0.3\nGET / HTTP/1.1\nHost: 127.0.0.1:8089\nUser-Agent: Wget\n";

/// A runner that records every command and answers from a script.
///
/// Rules are matched in insertion order against the command line; the first
/// rule whose fragment occurs in it wins. Unmatched commands succeed with
/// empty output.
pub struct ScriptedRunner {
    rules: Vec<(String, CommandOutcome)>,
    calls: Mutex<Vec<(String, RunOptions)>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer commands containing `fragment` with `outcome`
    pub fn respond(mut self, fragment: &str, outcome: CommandOutcome) -> Self {
        self.rules.push((fragment.to_string(), outcome));
        self
    }

    /// Fail commands containing `fragment` with `exit_code` and `stderr`
    pub fn fail(self, fragment: &str, exit_code: i32, stderr: &str) -> Self {
        self.respond(fragment, CommandOutcome::completed(exit_code, "", stderr))
    }

    /// Relay probe answered by a correctly forwarding relay
    pub fn with_working_relay(self) -> Self {
        self.respond(RELAY_PROBE, CommandOutcome::completed(0, RELAYED_BODY, ""))
    }

    /// Every command line, in execution order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(line, _)| line.clone())
            .collect()
    }

    /// Options passed with the first command containing `fragment`
    pub fn options_for(&self, fragment: &str) -> Option<RunOptions> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(line, _)| line.contains(fragment))
            .map(|(_, options)| *options)
    }

    /// Number of commands containing `fragment`
    pub fn count(&self, fragment: &str) -> usize {
        self.calls()
            .iter()
            .filter(|line| line.contains(fragment))
            .count()
    }

    /// Index of the first command containing `fragment`
    pub fn position(&self, fragment: &str) -> Option<usize> {
        self.calls().iter().position(|line| line.contains(fragment))
    }
}

#[async_trait]
impl Runner for ScriptedRunner {
    async fn run(&self, command: &Command, options: RunOptions) -> CommandOutcome {
        let line = command.to_string();
        self.calls.lock().unwrap().push((line.clone(), options));

        self.rules
            .iter()
            .find(|(fragment, _)| line.contains(fragment.as_str()))
            .map(|(_, outcome)| outcome.clone())
            .unwrap_or_else(|| CommandOutcome::completed(0, "", ""))
    }
}

/// Default scenario writing to `volume`, with no waiting
pub fn settings(volume: &Path) -> RunSettings {
    let mut settings = RunSettings::new(&HarnessEnv::default());
    settings.relays_file = volume.join("tailscale").join("relays.json");
    settings.startup = Readiness::Grace(Duration::ZERO);
    settings.restart = Readiness::Grace(Duration::ZERO);
    settings
}
