//! # Storage Errors

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Citizen storage errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    // Lookup errors
    #[error("Import `{0}` does not exist")]
    ImportNotFound(u64),

    #[error("Citizen `{citizen_id}` not found in import `{import_id}`")]
    CitizenNotFound { import_id: u64, citizen_id: u64 },

    #[error("Import `{0}` already exists")]
    ImportExists(u64),

    // Backend errors
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Corrupted document: {0}")]
    Corrupted(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Whether the error reports an absent import or citizen
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::ImportNotFound(_) | StorageError::CitizenNotFound { .. }
        )
    }

    pub(crate) fn lock_poisoned() -> Self {
        StorageError::Internal("Lock poisoned".to_string())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::IoError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(StorageError::ImportNotFound(1).is_not_found());
        assert!(StorageError::CitizenNotFound {
            import_id: 1,
            citizen_id: 2
        }
        .is_not_found());
        assert!(!StorageError::IoError("disk".into()).is_not_found());
        assert!(!StorageError::ImportExists(1).is_not_found());
    }

    #[test]
    fn test_messages_name_ids() {
        assert_eq!(
            StorageError::ImportNotFound(999).to_string(),
            "Import `999` does not exist"
        );
        let err = StorageError::CitizenNotFound {
            import_id: 3,
            citizen_id: 7,
        };
        assert!(err.to_string().contains("`7`"));
    }
}
