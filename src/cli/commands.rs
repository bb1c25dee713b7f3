//! CLI command implementations
//!
//! `serve` boots in a fixed order: config, logging, storage, service, HTTP.
//! `validate` touches no storage and logs nothing. An accepted body is reported
//! on stdout; a rejected one only through the returned error.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::config::{LoadedConfig, ServiceConfig};
use crate::http_server::HttpServer;
use crate::observability::{init_logging, Event};
use crate::service::ImportService;
use crate::storage::MemoryStore;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_json_file, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, host, port } => serve(&config, host, port),
        Command::Validate { input, config } => validate(&input, &config),
    }
}

fn load_config(path: &Path) -> CliResult<LoadedConfig> {
    ServiceConfig::load(path).map_err(|e| CliError::config_error(e.to_string()))
}

/// Start the HTTP server and block until shutdown.
pub fn serve(config_path: &Path, host: Option<String>, port: Option<u16>) -> CliResult<()> {
    let LoadedConfig { mut config, source } = load_config(config_path)?;
    if let Some(host) = host {
        config.http.host = host;
    }
    if let Some(port) = port {
        config.http.port = port;
    }

    init_logging(&config.logging)
        .map_err(|e| CliError::boot_failed(format!("Failed to initialise logging: {}", e)))?;

    match &source {
        Some(path) => info!(event = %Event::ConfigLoaded, path = %path.display(), "configuration loaded"),
        None => warn!(
            event = %Event::ConfigLoaded,
            path = %config_path.display(),
            "configuration file not found, using defaults"
        ),
    }

    let store = config
        .storage
        .open()
        .map_err(|e| CliError::boot_failed(format!("Failed to open storage: {}", e)))?;
    info!(
        event = %Event::StorageOpened,
        backend = ?config.storage.backend,
        "storage opened"
    );

    let service = Arc::new(ImportService::new(store, config.import));
    let server = HttpServer::with_config(config.http.clone(), service).with_debug(config.debug);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Validate an import body from `input` without storing it.
pub fn validate(input: &Path, config_path: &Path) -> CliResult<()> {
    let LoadedConfig { config, .. } = load_config(config_path)?;
    let body = read_json_file(input)?;

    let service = ImportService::new(Arc::new(MemoryStore::new()), config.import);
    match service.validate_import(&body) {
        Ok(citizens) => write_response(json!({ "citizens": citizens.len() })),
        Err(e) => Err(CliError::validation_failed(format!("{}: {}", e.code(), e))),
    }
}
