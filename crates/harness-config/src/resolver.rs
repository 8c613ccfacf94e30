//! Environment resolution for deployment parameters
//!
//! The harness reads three values once at start-up:
//! - `TAILRELAY_HOST`: host name of the relay node (default `tailrelay-dev`)
//! - `TAILNET_DOMAIN`: overlay network domain (default `my-tailnet.ts.net`)
//! - `COMPOSE_FILE`: compose file describing the test environment
//!   (default `./compose-test.yml`)
//!
//! Values are not validated beyond falling back to the default when unset or
//! empty; a bad value shows up later as a failing stage or probe.

use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Variable holding the relay host name
pub const HOST_VAR: &str = "TAILRELAY_HOST";
/// Variable holding the overlay network domain
pub const DOMAIN_VAR: &str = "TAILNET_DOMAIN";
/// Variable holding the compose file path
pub const COMPOSE_FILE_VAR: &str = "COMPOSE_FILE";

/// Default relay host name
pub const DEFAULT_HOST: &str = "tailrelay-dev";
/// Default overlay network domain
pub const DEFAULT_DOMAIN: &str = "my-tailnet.ts.net";
/// Default compose file
pub const DEFAULT_COMPOSE_FILE: &str = "./compose-test.yml";

/// Deployment parameters, immutable once resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessEnv {
    /// Relay host identifier
    pub host: String,
    /// Overlay network domain
    pub domain: String,
    /// Compose file for the test environment
    pub compose_file: PathBuf,
}

impl HarnessEnv {
    /// Resolve from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first. Variables that
    /// are already set in the process environment win over the file.
    pub fn from_process_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => debug!("Ignoring unreadable .env file: {}", e),
        }

        // Only our own names are read; unrelated or non-UTF-8 variables are ignored
        let vars: HashMap<String, String> = [HOST_VAR, DOMAIN_VAR, COMPOSE_FILE_VAR]
            .into_iter()
            .filter_map(|name| match std::env::var(name) {
                Ok(value) => Some((name.to_string(), value)),
                Err(e) => {
                    if matches!(e, std::env::VarError::NotUnicode(_)) {
                        debug!("Ignoring non UTF-8 value of {}", name);
                    }
                    None
                }
            })
            .collect();
        Self::from_vars(&vars)
    }

    /// Resolve from an explicit set of variables
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        Self {
            host: lookup(vars, HOST_VAR, DEFAULT_HOST),
            domain: lookup(vars, DOMAIN_VAR, DEFAULT_DOMAIN),
            compose_file: PathBuf::from(lookup(vars, COMPOSE_FILE_VAR, DEFAULT_COMPOSE_FILE)),
        }
    }

    /// Fully qualified name of the relay node on the overlay network
    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.host, self.domain)
    }
}

impl Default for HarnessEnv {
    fn default() -> Self {
        Self::from_vars(&HashMap::new())
    }
}

fn lookup(vars: &HashMap<String, String>, name: &str, default: &str) -> String {
    match vars.get(name).map(|v| v.trim()) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => default.to_string(),
    }
}
