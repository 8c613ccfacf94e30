//! Runtime-agnostic command execution library
//!
//! This crate runs external commands as argument vectors (never through a
//! shell) and always hands back a [`CommandOutcome`]: non-zero exits, spawn
//! failures and timeouts are all reported as data rather than errors.

#![warn(missing_docs)]

pub mod backends;
pub mod command;
pub mod error;
pub mod outcome;
pub mod runner;

pub use backends::LocalRunner;
pub use command::Command;
pub use error::{Error, Result};
pub use outcome::{CommandOutcome, SPAWN_FAILURE_EXIT_CODE, TIMEOUT_EXIT_CODE};
pub use runner::{OutputMode, RunOptions, Runner};
