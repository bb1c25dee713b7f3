//! # In-Memory Backend

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::schema::{Citizen, CitizenPatch};

use super::errors::{StorageError, StorageResult};
use super::store::{CitizenStore, ImportTable};

/// In-memory citizen store.
///
/// Every operation takes the table lock once, so a batch becomes visible
/// all at once and each record update is atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    counter: AtomicU64,
    imports: RwLock<HashMap<u64, ImportTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of visible imports
    pub fn import_count(&self) -> StorageResult<usize> {
        let imports = self.imports.read().map_err(|_| StorageError::lock_poisoned())?;
        Ok(imports.len())
    }

    fn with_import<T>(
        &self,
        import_id: u64,
        f: impl FnOnce(&mut ImportTable) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let mut imports = self.imports.write().map_err(|_| StorageError::lock_poisoned())?;
        let table = imports
            .get_mut(&import_id)
            .ok_or(StorageError::ImportNotFound(import_id))?;
        f(table)
    }
}

impl CitizenStore for MemoryStore {
    fn generate_import_id(&self) -> StorageResult<u64> {
        Ok(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn write_batch(&self, import_id: u64, citizens: &[Citizen]) -> StorageResult<()> {
        let mut imports = self.imports.write().map_err(|_| StorageError::lock_poisoned())?;
        if imports.contains_key(&import_id) {
            return Err(StorageError::ImportExists(import_id));
        }
        imports.insert(import_id, ImportTable::new(import_id, citizens.to_vec()));
        Ok(())
    }

    fn delete_import(&self, import_id: u64) -> StorageResult<()> {
        let mut imports = self.imports.write().map_err(|_| StorageError::lock_poisoned())?;
        imports.remove(&import_id);
        Ok(())
    }

    fn get_citizen(&self, import_id: u64, citizen_id: u64) -> StorageResult<Citizen> {
        let imports = self.imports.read().map_err(|_| StorageError::lock_poisoned())?;
        let table = imports
            .get(&import_id)
            .ok_or(StorageError::ImportNotFound(import_id))?;
        table.get(citizen_id).cloned()
    }

    fn set_citizen_fields(
        &self,
        import_id: u64,
        citizen_id: u64,
        patch: &CitizenPatch,
    ) -> StorageResult<Citizen> {
        self.with_import(import_id, |table| table.set_fields(citizen_id, patch))
    }

    fn add_relative(
        &self,
        import_id: u64,
        citizen_id: u64,
        relative_id: u64,
    ) -> StorageResult<()> {
        self.with_import(import_id, |table| table.add_relative(citizen_id, relative_id))
    }

    fn remove_relative(
        &self,
        import_id: u64,
        citizen_id: u64,
        relative_id: u64,
    ) -> StorageResult<()> {
        self.with_import(import_id, |table| {
            table.remove_relative(citizen_id, relative_id)
        })
    }

    fn list_citizens(&self, import_id: u64) -> StorageResult<Vec<Citizen>> {
        let imports = self.imports.read().map_err(|_| StorageError::lock_poisoned())?;
        imports
            .get(&import_id)
            .map(|table| table.citizens().to_vec())
            .ok_or(StorageError::ImportNotFound(import_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Gender;

    fn citizen(citizen_id: u64, relatives: &[u64]) -> Citizen {
        Citizen {
            citizen_id,
            town: "NY".into(),
            street: "Lenina".into(),
            building: "1b".into(),
            apartment: 202,
            name: "Bob".into(),
            birth_date: "21.12.2012".into(),
            gender: Gender::Male,
            relatives: relatives.to_vec(),
        }
    }

    #[test]
    fn test_generate_import_id_is_monotonic() {
        let store = MemoryStore::new();
        let first = store.generate_import_id().unwrap();
        let second = store.generate_import_id().unwrap();
        assert!(first > 0);
        assert!(second > first);
    }

    #[test]
    fn test_write_then_list_preserves_order() {
        let store = MemoryStore::new();
        store
            .write_batch(1, &[citizen(3, &[]), citizen(1, &[]), citizen(2, &[])])
            .unwrap();

        let ids: Vec<_> = store
            .list_citizens(1)
            .unwrap()
            .iter()
            .map(|c| c.citizen_id)
            .collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_write_batch_refuses_existing_import() {
        let store = MemoryStore::new();
        store.write_batch(1, &[citizen(1, &[])]).unwrap();
        assert_eq!(
            store.write_batch(1, &[citizen(2, &[])]),
            Err(StorageError::ImportExists(1))
        );
    }

    #[test]
    fn test_unknown_import_and_citizen() {
        let store = MemoryStore::new();
        assert_eq!(store.list_citizens(999), Err(StorageError::ImportNotFound(999)));
        assert_eq!(store.get_citizen(999, 1), Err(StorageError::ImportNotFound(999)));

        store.write_batch(1, &[citizen(1, &[])]).unwrap();
        assert_eq!(
            store.get_citizen(1, 3),
            Err(StorageError::CitizenNotFound {
                import_id: 1,
                citizen_id: 3
            })
        );
    }

    #[test]
    fn test_set_fields_merges() {
        let store = MemoryStore::new();
        store.write_batch(1, &[citizen(3, &[])]).unwrap();

        let patch = CitizenPatch {
            name: Some("Tom".into()),
            street: Some("Tverskaya".into()),
            relatives: Some(vec![3]),
            ..Default::default()
        };
        let updated = store.set_citizen_fields(1, 3, &patch).unwrap();
        assert_eq!(updated.name, "Tom");
        assert_eq!(updated.street, "Tverskaya");
        assert_eq!(updated.relatives, vec![3]);
        assert_eq!(updated.town, "NY");
        assert_eq!(store.get_citizen(1, 3).unwrap(), updated);
    }

    #[test]
    fn test_relative_edges_are_idempotent() {
        let store = MemoryStore::new();
        store.write_batch(1, &[citizen(1, &[]), citizen(2, &[])]).unwrap();

        store.add_relative(1, 1, 2).unwrap();
        store.add_relative(1, 1, 2).unwrap();
        assert_eq!(store.get_citizen(1, 1).unwrap().relatives, vec![2]);

        store.remove_relative(1, 1, 2).unwrap();
        store.remove_relative(1, 1, 2).unwrap();
        assert!(store.get_citizen(1, 1).unwrap().relatives.is_empty());

        assert!(store.add_relative(1, 5, 2).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_import() {
        let store = MemoryStore::new();
        store.write_batch(1, &[citizen(1, &[])]).unwrap();
        assert_eq!(store.import_count().unwrap(), 1);

        store.delete_import(1).unwrap();
        store.delete_import(1).unwrap();
        assert_eq!(store.import_count().unwrap(), 0);
        assert_eq!(store.list_citizens(1), Err(StorageError::ImportNotFound(1)));
    }
}
