//! End-to-end test harness for the tailrelay container.
//!
//! A run tears the compose environment down, builds and starts it, writes a
//! relay configuration onto the shared volume, probes the service from
//! inside its container and prints a report before tearing down again.
//! See [`run::RunController`] for the exact sequence.

#![warn(missing_docs)]

pub mod error;
pub mod injector;
pub mod lifecycle;
pub mod logging;
pub mod probe;
pub mod readiness;
pub mod report;
pub mod run;

pub use error::{HarnessError, Result};
pub use run::{RunController, RunReport, RunSettings};
