//! # Citizen Store Trait
//!
//! The only capability the import and update logic depends on. Backends
//! must make each call atomic on its own; no call spans another.

use std::collections::HashMap;
use std::fmt;

use crate::schema::{Citizen, CitizenPatch};

use super::errors::{StorageError, StorageResult};

/// Backend trait for citizen storage
pub trait CitizenStore: Send + Sync + fmt::Debug {
    /// Next import identifier from a monotonic counter
    fn generate_import_id(&self) -> StorageResult<u64>;

    /// Persist a whole import under `import_id`
    fn write_batch(&self, import_id: u64, citizens: &[Citizen]) -> StorageResult<()>;

    /// Remove an import and everything written under it. Absent imports are
    /// not an error, so rollback can always be attempted.
    fn delete_import(&self, import_id: u64) -> StorageResult<()>;

    /// Fetch one citizen
    fn get_citizen(&self, import_id: u64, citizen_id: u64) -> StorageResult<Citizen>;

    /// Overwrite the fields present in `patch`, returning the merged record
    fn set_citizen_fields(
        &self,
        import_id: u64,
        citizen_id: u64,
        patch: &CitizenPatch,
    ) -> StorageResult<Citizen>;

    /// Add `relative_id` to `citizen_id`'s relatives if not already there
    fn add_relative(&self, import_id: u64, citizen_id: u64, relative_id: u64)
        -> StorageResult<()>;

    /// Drop `relative_id` from `citizen_id`'s relatives if present
    fn remove_relative(
        &self,
        import_id: u64,
        citizen_id: u64,
        relative_id: u64,
    ) -> StorageResult<()>;

    /// Every citizen of an import, in insertion order
    fn list_citizens(&self, import_id: u64) -> StorageResult<Vec<Citizen>>;
}

/// Citizens of one import with an id → position index.
///
/// Shared by the backends so lookups stay O(1) while insertion order is
/// preserved for listing.
#[derive(Debug, Clone, Default)]
pub(crate) struct ImportTable {
    import_id: u64,
    citizens: Vec<Citizen>,
    positions: HashMap<u64, usize>,
}

impl ImportTable {
    pub(crate) fn new(import_id: u64, citizens: Vec<Citizen>) -> Self {
        let positions = citizens
            .iter()
            .enumerate()
            .map(|(pos, c)| (c.citizen_id, pos))
            .collect();
        Self {
            import_id,
            citizens,
            positions,
        }
    }

    pub(crate) fn citizens(&self) -> &[Citizen] {
        &self.citizens
    }

    pub(crate) fn get(&self, citizen_id: u64) -> StorageResult<&Citizen> {
        self.positions
            .get(&citizen_id)
            .map(|&pos| &self.citizens[pos])
            .ok_or(StorageError::CitizenNotFound {
                import_id: self.import_id,
                citizen_id,
            })
    }

    pub(crate) fn get_mut(&mut self, citizen_id: u64) -> StorageResult<&mut Citizen> {
        match self.positions.get(&citizen_id) {
            Some(&pos) => Ok(&mut self.citizens[pos]),
            None => Err(StorageError::CitizenNotFound {
                import_id: self.import_id,
                citizen_id,
            }),
        }
    }

    pub(crate) fn add_relative(&mut self, citizen_id: u64, relative_id: u64) -> StorageResult<()> {
        let citizen = self.get_mut(citizen_id)?;
        if !citizen.has_relative(relative_id) {
            citizen.relatives.push(relative_id);
        }
        Ok(())
    }

    pub(crate) fn remove_relative(
        &mut self,
        citizen_id: u64,
        relative_id: u64,
    ) -> StorageResult<()> {
        let citizen = self.get_mut(citizen_id)?;
        citizen.relatives.retain(|&rid| rid != relative_id);
        Ok(())
    }

    pub(crate) fn set_fields(
        &mut self,
        citizen_id: u64,
        patch: &CitizenPatch,
    ) -> StorageResult<Citizen> {
        let citizen = self.get_mut(citizen_id)?;
        citizen.apply(patch);
        Ok(citizen.clone())
    }
}
