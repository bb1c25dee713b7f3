//! Observable events for the citizens service
//!
//! Every lifecycle log line is named by one of these. Events are explicit
//! and typed so log consumers can match on a fixed vocabulary.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Configuration loaded (or defaulted)
    ConfigLoaded,
    /// Storage backend opened
    StorageOpened,
    /// Server bound and serving
    Serving,
    /// Shutdown complete
    ShutdownComplete,

    // Imports
    /// Import validated and persisted
    ImportCreated,
    /// Import rejected by validation
    ImportRejected,
    /// Persisting an import failed
    ImportWriteFailed,
    /// Partially written import removed
    ImportRolledBack,
    /// Rollback itself failed; the import may be partially visible
    ImportRollbackFailed,

    // Citizen updates
    /// Citizen update applied
    CitizenUpdated,
    /// Citizen update rejected before any write
    CitizenUpdateRejected,
    /// One relative edge changed on a remote record
    RelativeEdgeApplied,
    /// Relative edges left half-applied
    RelativesPartiallyUpdated,

    // Requests
    /// Request failed with a client error
    RequestRejected,
    /// Request failed with a server error
    RequestFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            // Boot & Lifecycle
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StorageOpened => "STORAGE_OPENED",
            Event::Serving => "CITIZENS_SERVING",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            // Imports
            Event::ImportCreated => "IMPORT_CREATED",
            Event::ImportRejected => "IMPORT_REJECTED",
            Event::ImportWriteFailed => "IMPORT_WRITE_FAILED",
            Event::ImportRolledBack => "IMPORT_ROLLED_BACK",
            Event::ImportRollbackFailed => "IMPORT_ROLLBACK_FAILED",

            // Citizen updates
            Event::CitizenUpdated => "CITIZEN_UPDATED",
            Event::CitizenUpdateRejected => "CITIZEN_UPDATE_REJECTED",
            Event::RelativeEdgeApplied => "RELATIVE_EDGE_APPLIED",
            Event::RelativesPartiallyUpdated => "RELATIVES_PARTIALLY_UPDATED",

            // Requests
            Event::RequestRejected => "REQUEST_REJECTED",
            Event::RequestFailed => "REQUEST_FAILED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
