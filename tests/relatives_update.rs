//! Relative-Graph Update Tests
//!
//! Patching a citizen's relatives mirrors every changed edge onto the other
//! citizen. A relative that vanishes mid-update is reported, not hidden.

mod common;

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use citizens::schema::{Citizen, CitizenPatch};
use citizens::service::{DataValidationError, ImportConfig, ImportService, ServiceError};
use citizens::storage::{
    CitizenStore, FileStore, MemoryStore, StorageConfig, StorageError, StorageResult,
};

use common::{import_body, record};

// =============================================================================
// Test Utilities
// =============================================================================

/// Store where one citizen can be read but disappears on the first write.
#[derive(Debug)]
struct VanishingStore {
    inner: MemoryStore,
    vanishing: u64,
}

impl CitizenStore for VanishingStore {
    fn generate_import_id(&self) -> StorageResult<u64> {
        self.inner.generate_import_id()
    }

    fn write_batch(&self, import_id: u64, citizens: &[Citizen]) -> StorageResult<()> {
        self.inner.write_batch(import_id, citizens)
    }

    fn delete_import(&self, import_id: u64) -> StorageResult<()> {
        self.inner.delete_import(import_id)
    }

    fn get_citizen(&self, import_id: u64, citizen_id: u64) -> StorageResult<Citizen> {
        self.inner.get_citizen(import_id, citizen_id)
    }

    fn set_citizen_fields(
        &self,
        import_id: u64,
        citizen_id: u64,
        patch: &CitizenPatch,
    ) -> StorageResult<Citizen> {
        self.inner.set_citizen_fields(import_id, citizen_id, patch)
    }

    fn add_relative(&self, import_id: u64, citizen_id: u64, relative_id: u64) -> StorageResult<()> {
        if citizen_id == self.vanishing {
            return Err(StorageError::CitizenNotFound {
                import_id,
                citizen_id,
            });
        }
        self.inner.add_relative(import_id, citizen_id, relative_id)
    }

    fn remove_relative(
        &self,
        import_id: u64,
        citizen_id: u64,
        relative_id: u64,
    ) -> StorageResult<()> {
        self.inner.remove_relative(import_id, citizen_id, relative_id)
    }

    fn list_citizens(&self, import_id: u64) -> StorageResult<Vec<Citizen>> {
        self.inner.list_citizens(import_id)
    }
}

fn relatives_of(store: &dyn CitizenStore, import_id: u64, citizen_id: u64) -> Vec<u64> {
    store.get_citizen(import_id, citizen_id).unwrap().relatives
}

// =============================================================================
// Symmetric updates
// =============================================================================

#[test]
fn test_adding_relative_updates_both_sides() {
    let store = Arc::new(MemoryStore::new());
    let service = ImportService::new(store.clone(), ImportConfig::default());
    let import_id = service
        .create_import(&import_body(vec![record(1, &[]), record(2, &[])]))
        .unwrap();

    let updated = service
        .update_citizen(import_id, 1, &json!({"relatives": [2]}))
        .unwrap();

    assert_eq!(updated.relatives, vec![2]);
    assert_eq!(relatives_of(store.as_ref(), import_id, 2), vec![1]);
}

#[test]
fn test_file_backend_keeps_graph_symmetric() {
    let temp = TempDir::new().unwrap();
    let store = StorageConfig::file(temp.path()).open().unwrap();
    let service = ImportService::new(store, ImportConfig::default());
    let import_id = service
        .create_import(&import_body(vec![
            record(1, &[2]),
            record(2, &[1, 3]),
            record(3, &[2]),
        ]))
        .unwrap();

    service
        .update_citizen(import_id, 2, &json!({"relatives": [1], "town": "Керчь"}))
        .unwrap();

    let reopened = FileStore::open(temp.path()).unwrap();
    assert_eq!(relatives_of(&reopened, import_id, 2), vec![1]);
    assert!(relatives_of(&reopened, import_id, 3).is_empty());
    assert_eq!(relatives_of(&reopened, import_id, 1), vec![2]);
    assert_eq!(reopened.get_citizen(import_id, 2).unwrap().town, "Керчь");
}

#[test]
fn test_clearing_relatives() {
    let store = Arc::new(MemoryStore::new());
    let service = ImportService::new(store.clone(), ImportConfig::default());
    let import_id = service
        .create_import(&import_body(vec![
            record(1, &[2, 3]),
            record(2, &[1]),
            record(3, &[1]),
        ]))
        .unwrap();

    let updated = service
        .update_citizen(import_id, 1, &json!({"relatives": []}))
        .unwrap();

    assert!(updated.relatives.is_empty());
    assert!(relatives_of(store.as_ref(), import_id, 2).is_empty());
    assert!(relatives_of(store.as_ref(), import_id, 3).is_empty());
}

// =============================================================================
// Rejections before any write
// =============================================================================

#[test]
fn test_invalid_patch_writes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let service = ImportService::new(store.clone(), ImportConfig::default());
    let import_id = service
        .create_import(&import_body(vec![record(1, &[]), record(2, &[])]))
        .unwrap();

    for body in [
        json!({"relatives": [2], "apartment": -1}),
        json!({"relatives": [2, 2]}),
        json!({"relatives": [2], "nickname": "x"}),
        json!({"citizen_id": 1}),
    ] {
        let err = service.update_citizen(import_id, 1, &body).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(DataValidationError::Update(_))
        ));
    }
    assert!(relatives_of(store.as_ref(), import_id, 2).is_empty());
}

// =============================================================================
// Partial failure
// =============================================================================

#[test]
fn test_vanished_relative_reports_partial_update() {
    let store = Arc::new(VanishingStore {
        inner: MemoryStore::new(),
        vanishing: 4,
    });
    let service = ImportService::new(store.clone(), ImportConfig::default());
    let import_id = service
        .create_import(&import_body(vec![
            record(1, &[2]),
            record(2, &[1]),
            record(3, &[]),
            record(4, &[]),
        ]))
        .unwrap();

    let err = service
        .update_citizen(import_id, 1, &json!({"relatives": [3, 4]}))
        .unwrap_err();

    assert_eq!(
        err,
        ServiceError::RelativesPartiallyUpdated {
            import_id,
            citizen_id: 1,
            relative_id: 4,
            applied: 2,
        }
    );
    assert_eq!(err.code(), "CITIZENS_RELATIVES_PARTIALLY_UPDATED");
    assert_eq!(err.status_code(), 400);

    // earlier edges stay applied, the citizen's own record is untouched
    assert!(relatives_of(store.as_ref(), import_id, 2).is_empty());
    assert_eq!(relatives_of(store.as_ref(), import_id, 3), vec![1]);
    assert_eq!(relatives_of(store.as_ref(), import_id, 1), vec![2]);
}
