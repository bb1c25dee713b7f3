//! JSON I/O for CLI commands
//!
//! - Input: one JSON document read from a file
//! - Output: one JSON object per line on stdout

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Read a JSON document from `path`
pub fn read_json_file(path: &Path) -> CliResult<Value> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", path.display(), e)))?;
    if content.trim().is_empty() {
        return Err(CliError::io_error(format!("{} is empty", path.display())));
    }
    Ok(serde_json::from_str(&content)?)
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_json(&json!({
        "status": "ok",
        "data": data
    }))
}

/// Write a JSON value to stdout, one line
pub fn write_json(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}
