//! # File Document Backend
//!
//! One JSON document per import under `<root>/imports/<id>.json`, the
//! import counter in `<root>/import_id`. Every write goes to a temp file
//! first and is renamed into place, so readers see either the old document
//! or the new one.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::schema::{Citizen, CitizenPatch};

use super::errors::{StorageError, StorageResult};
use super::store::{CitizenStore, ImportTable};

const IMPORTS_DIR: &str = "imports";
const COUNTER_FILE: &str = "import_id";

/// File-backed citizen store
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    /// Serialises read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(IMPORTS_DIR))?;
        Ok(Self {
            root,
            lock: Mutex::new(()),
        })
    }

    fn import_path(&self, import_id: u64) -> PathBuf {
        self.root.join(IMPORTS_DIR).join(format!("{}.json", import_id))
    }

    fn counter_path(&self) -> PathBuf {
        self.root.join(COUNTER_FILE)
    }

    fn guard(&self) -> StorageResult<MutexGuard<'_, ()>> {
        self.lock.lock().map_err(|_| StorageError::lock_poisoned())
    }

    fn read_import(&self, import_id: u64) -> StorageResult<ImportTable> {
        let bytes = fs::read(self.import_path(import_id)).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StorageError::ImportNotFound(import_id)
            } else {
                StorageError::from(e)
            }
        })?;
        let citizens: Vec<Citizen> = serde_json::from_slice(&bytes)
            .map_err(|e| StorageError::Corrupted(format!("import {}: {}", import_id, e)))?;
        Ok(ImportTable::new(import_id, citizens))
    }

    fn write_import(&self, import_id: u64, citizens: &[Citizen]) -> StorageResult<()> {
        let bytes = serde_json::to_vec(citizens)
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        write_atomic(&self.import_path(import_id), &bytes)
    }

    fn modify_import<T>(
        &self,
        import_id: u64,
        f: impl FnOnce(&mut ImportTable) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let _guard = self.guard()?;
        let mut table = self.read_import(import_id)?;
        let out = f(&mut table)?;
        self.write_import(import_id, table.citizens())?;
        Ok(out)
    }
}

/// Writes `bytes` next to `path` and renames over it. The temp file never
/// outlives a failed write.
fn write_atomic(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let tmp = path.with_extension("tmp");
    let result = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    Ok(result?)
}

impl CitizenStore for FileStore {
    fn generate_import_id(&self) -> StorageResult<u64> {
        let _guard = self.guard()?;
        let path = self.counter_path();
        let current = match fs::read_to_string(&path) {
            Ok(text) => text
                .trim()
                .parse::<u64>()
                .map_err(|e| StorageError::Corrupted(format!("import counter: {}", e)))?,
            Err(e) if e.kind() == ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };
        let next = current + 1;
        write_atomic(&path, next.to_string().as_bytes())?;
        Ok(next)
    }

    fn write_batch(&self, import_id: u64, citizens: &[Citizen]) -> StorageResult<()> {
        let _guard = self.guard()?;
        if self.import_path(import_id).exists() {
            return Err(StorageError::ImportExists(import_id));
        }
        self.write_import(import_id, citizens)
    }

    fn delete_import(&self, import_id: u64) -> StorageResult<()> {
        let _guard = self.guard()?;
        match fs::remove_file(self.import_path(import_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn get_citizen(&self, import_id: u64, citizen_id: u64) -> StorageResult<Citizen> {
        let table = self.read_import(import_id)?;
        table.get(citizen_id).cloned()
    }

    fn set_citizen_fields(
        &self,
        import_id: u64,
        citizen_id: u64,
        patch: &CitizenPatch,
    ) -> StorageResult<Citizen> {
        self.modify_import(import_id, |table| table.set_fields(citizen_id, patch))
    }

    fn add_relative(
        &self,
        import_id: u64,
        citizen_id: u64,
        relative_id: u64,
    ) -> StorageResult<()> {
        self.modify_import(import_id, |table| table.add_relative(citizen_id, relative_id))
    }

    fn remove_relative(
        &self,
        import_id: u64,
        citizen_id: u64,
        relative_id: u64,
    ) -> StorageResult<()> {
        self.modify_import(import_id, |table| {
            table.remove_relative(citizen_id, relative_id)
        })
    }

    fn list_citizens(&self, import_id: u64) -> StorageResult<Vec<Citizen>> {
        let table = self.read_import(import_id)?;
        Ok(table.citizens().to_vec())
    }
}
