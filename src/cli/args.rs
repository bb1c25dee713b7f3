//! CLI argument definitions using clap
//!
//! Commands:
//! - citizens serve [--config <path>] [--host <host>] [--port <port>]
//! - citizens validate --input <file> [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;

/// Citizens - import service for citizen records with mutual relatives
#[derive(Parser, Debug)]
#[command(name = "citizens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate an import body offline and exit
    Validate {
        /// JSON file holding `{"citizens": [...]}`
        #[arg(long)]
        input: PathBuf,

        /// Path to configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
