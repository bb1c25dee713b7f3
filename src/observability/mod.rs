//! Observability subsystem
//!
//! - Typed lifecycle events naming every log line
//! - `tracing` subscriber setup from configuration
//!
//! # Usage
//!
//! ```ignore
//! use citizens::observability::{init_logging, Event, LogConfig};
//!
//! init_logging(&LogConfig::default())?;
//! tracing::info!(event = %Event::ImportCreated, import_id = 1, "import created");
//! ```

mod events;
mod logging;

pub use events::Event;
pub use logging::{init_logging, LogConfig, LogFormat};
