//! CLI module for the citizens service
//!
//! Provides command-line interface for:
//! - serve: Load configuration and run the HTTP server
//! - validate: Check an import body offline

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{run, run_command, serve, validate};
pub use errors::{CliError, CliErrorCode, CliResult};
