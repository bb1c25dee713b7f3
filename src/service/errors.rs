//! Service error taxonomy
//!
//! - `DataValidationError`: the request body is not acceptable data
//! - `BatchError`: an import broke a cross-record invariant
//! - `NotFound`: an import or citizen is absent
//! - `RelativesPartiallyUpdated`: some relative edges changed before a
//!   relative vanished; the edits already made are NOT rolled back
//! - `Storage`: backend failure, never recovered locally
//!
//! Every variant carries a stable code and an HTTP status. Absent resources
//! map to 400, not 404, to keep the public contract.

use thiserror::Error;

use crate::batch::BatchError;
use crate::schema::RecordError;
use crate::storage::StorageError;

/// The request data failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataValidationError {
    #[error("No `citizens` field present")]
    MissingCitizens,

    #[error("Citizen at position {index} is invalid. {source}")]
    Citizen { index: usize, source: RecordError },

    #[error("{0}")]
    Update(RecordError),

    #[error("Citizen `{0}` cannot list itself as a relative")]
    SelfRelative(u64),
}

impl DataValidationError {
    /// The record-level failure underneath, if any.
    pub fn record_error(&self) -> Option<&RecordError> {
        match self {
            DataValidationError::Citizen { source, .. } => Some(source),
            DataValidationError::Update(source) => Some(source),
            _ => None,
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by the import service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    // ==================
    // Client Errors (400)
    // ==================
    #[error(transparent)]
    Validation(#[from] DataValidationError),

    #[error(transparent)]
    Consistency(#[from] BatchError),

    #[error("{0}")]
    NotFound(StorageError),

    #[error(
        "Relative `{relative_id}` not found while updating citizen `{citizen_id}` \
         of import `{import_id}`; {applied} relative edge change(s) already applied"
    )]
    RelativesPartiallyUpdated {
        import_id: u64,
        citizen_id: u64,
        relative_id: u64,
        applied: usize,
    },

    // ==================
    // Server Errors (5xx)
    // ==================
    #[error("Storage unavailable: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for ServiceError {
    fn from(e: StorageError) -> Self {
        if e.is_not_found() {
            ServiceError::NotFound(e)
        } else {
            ServiceError::Storage(e)
        }
    }
}

impl ServiceError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(DataValidationError::MissingCitizens) => {
                "CITIZENS_MISSING_CITIZENS"
            }
            ServiceError::Validation(DataValidationError::SelfRelative(_)) => {
                "CITIZENS_SELF_RELATIVE"
            }
            ServiceError::Validation(e) => match e.record_error() {
                Some(RecordError::UnknownField(_)) => "CITIZENS_UNKNOWN_FIELD",
                Some(RecordError::MissingField(_)) => "CITIZENS_MISSING_FIELD",
                Some(RecordError::InvalidField { .. }) => "CITIZENS_FIELD_INVALID",
                Some(RecordError::ImmutableField(_)) => "CITIZENS_IMMUTABLE_FIELD",
                _ => "CITIZENS_MALFORMED_RECORD",
            },
            ServiceError::Consistency(e) => match e {
                BatchError::NonUniqueCitizenId(_) => "CITIZENS_NON_UNIQUE_ID",
                BatchError::SelfRelative(_) => "CITIZENS_SELF_RELATIVE",
                BatchError::NonExistentRelatives(_) => "CITIZENS_NON_EXISTENT_RELATIVES",
                BatchError::InvalidRelatives(_) => "CITIZENS_ASYMMETRIC_RELATIVES",
            },
            ServiceError::NotFound(StorageError::ImportNotFound(_)) => "CITIZENS_IMPORT_NOT_FOUND",
            ServiceError::NotFound(_) => "CITIZENS_CITIZEN_NOT_FOUND",
            ServiceError::RelativesPartiallyUpdated { .. } => "CITIZENS_RELATIVES_PARTIALLY_UPDATED",
            ServiceError::Storage(_) => "CITIZENS_STORAGE_UNAVAILABLE",
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Storage(_) => 503,
            _ => 400,
        }
    }

    /// Whether the client caused the failure
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
