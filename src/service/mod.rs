//! # Import Service
//!
//! Ties record validation, batch checks and the storage capability together:
//!
//! - [`ImportService::create_import`]: validate a whole batch, then persist it
//!   all-or-nothing under a fresh import id
//! - [`ImportService::update_citizen`]: partial update of one citizen, keeping
//!   relative edges symmetric one edge at a time
//! - [`ImportService::citizens`], [`ImportService::birthdays`],
//!   [`ImportService::age_percentiles`]: read-side queries
//!
//! Every operation is synchronous. Async callers run them on the blocking
//! pool so a dropped request never aborts a half-applied write.
//!
//! Concurrent updates touching overlapping relative sets are not
//! serialised here; their per-edge writes may interleave.

mod errors;
mod importer;
mod queries;
mod updater;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::batch::BatchChecker;
use crate::schema::CitizenValidator;
use crate::storage::CitizenStore;

pub use errors::{DataValidationError, ServiceError, ServiceResult};
pub use queries::{Birthdays, Presents, TownAgeStats};
pub use updater::RelativesDiff;

/// Import policy knobs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Accept a citizen listing itself as a relative (default: false)
    #[serde(default)]
    pub allow_self_relative: bool,
}

/// Import orchestrator and query front over a [`CitizenStore`].
#[derive(Debug, Clone)]
pub struct ImportService {
    store: Arc<dyn CitizenStore>,
    validator: CitizenValidator,
    checker: BatchChecker,
    config: ImportConfig,
}

impl ImportService {
    pub fn new(store: Arc<dyn CitizenStore>, config: ImportConfig) -> Self {
        Self {
            store,
            validator: CitizenValidator::new(),
            checker: BatchChecker::new(config.allow_self_relative),
            config,
        }
    }

    /// Replaces the record validator, e.g. to pin "today" in tests.
    #[must_use]
    pub fn with_validator(mut self, validator: CitizenValidator) -> Self {
        self.validator = validator;
        self
    }
}
