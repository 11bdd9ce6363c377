//! CLI module for Commander
//!
//! Provides command-line interface for:
//! - init: Create the database and schema
//! - serve: Run the HTTP API

mod args;
mod commands;
mod errors;

pub use args::{Cli, CliCommand};
pub use commands::{init, open_store, run, run_command, serve, Config, DEFAULT_CONFIG_PATH};
pub use errors::{CliError, CliErrorCode, CliResult};
