//! Relative-graph updater
//!
//! Update stages, each one aborting the request on failure:
//!
//! ```text
//! RECEIVED -> FIELD_VALIDATED -> RELATIVES_DIFFED -> RELATIVES_PROPAGATED -> PERSISTED
//! ```
//!
//! The two relative stages only run when the patch carries `relatives`.
//! Edge propagation is one store call per edge with no rollback: a relative
//! that vanishes mid-way leaves the earlier edges applied and is reported
//! as [`ServiceError::RelativesPartiallyUpdated`].

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::observability::Event;
use crate::schema::{Citizen, CitizenPatch};

use super::errors::{DataValidationError, ServiceError, ServiceResult};
use super::ImportService;

/// Stage an update reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateStage {
    Received,
    FieldValidated,
    RelativesDiffed,
    RelativesPropagated,
    Persisted,
}

impl fmt::Display for UpdateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpdateStage::Received => "RECEIVED",
            UpdateStage::FieldValidated => "FIELD_VALIDATED",
            UpdateStage::RelativesDiffed => "RELATIVES_DIFFED",
            UpdateStage::RelativesPropagated => "RELATIVES_PROPAGATED",
            UpdateStage::Persisted => "PERSISTED",
        };
        f.write_str(name)
    }
}

/// Edge changes between two relative lists, each side in list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelativesDiff {
    /// In the old list only
    pub removed: Vec<u64>,
    /// In the new list only
    pub added: Vec<u64>,
}

impl RelativesDiff {
    pub fn between(old: &[u64], new: &[u64]) -> Self {
        let old_set: HashSet<u64> = old.iter().copied().collect();
        let new_set: HashSet<u64> = new.iter().copied().collect();
        Self {
            removed: old.iter().copied().filter(|id| !new_set.contains(id)).collect(),
            added: new.iter().copied().filter(|id| !old_set.contains(id)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    /// Number of edge mutations this diff needs
    pub fn len(&self) -> usize {
        self.removed.len() + self.added.len()
    }
}

impl ImportService {
    /// Applies a partial update to one citizen and returns the merged record.
    ///
    /// # Errors
    ///
    /// - `Validation` if the patch is invalid, touches `citizen_id`, or
    ///   names the citizen as its own relative
    /// - `NotFound` if the import, the citizen or an added relative is absent
    ///   (nothing written)
    /// - `RelativesPartiallyUpdated` if a relative vanished while edges were
    ///   being changed (earlier edges stay applied)
    /// - `Storage` on backend failure
    pub fn update_citizen(
        &self,
        import_id: u64,
        citizen_id: u64,
        body: &Value,
    ) -> ServiceResult<Citizen> {
        let mut stage = UpdateStage::Received;
        debug!(import_id, citizen_id, %stage, "citizen update");

        let result = self.run_update(import_id, citizen_id, body, &mut stage);
        match &result {
            Ok(_) => info!(event = %Event::CitizenUpdated, import_id, citizen_id, "citizen updated"),
            Err(e @ ServiceError::RelativesPartiallyUpdated { .. }) => error!(
                event = %Event::RelativesPartiallyUpdated,
                import_id,
                citizen_id,
                %stage,
                error = %e,
                "relatives left partially updated"
            ),
            Err(e) => warn!(
                event = %Event::CitizenUpdateRejected,
                import_id,
                citizen_id,
                %stage,
                code = e.code(),
                error = %e,
                "citizen update failed"
            ),
        }
        result
    }

    fn run_update(
        &self,
        import_id: u64,
        citizen_id: u64,
        body: &Value,
        stage: &mut UpdateStage,
    ) -> ServiceResult<Citizen> {
        let patch = self
            .validator
            .validate_patch(body)
            .map_err(DataValidationError::Update)?;
        *stage = UpdateStage::FieldValidated;

        if let Some(relatives) = &patch.relatives {
            if !self.config.allow_self_relative && relatives.contains(&citizen_id) {
                return Err(DataValidationError::SelfRelative(citizen_id).into());
            }

            let current = self.store.get_citizen(import_id, citizen_id)?;
            let diff = RelativesDiff::between(&current.relatives, relatives);
            for &relative_id in &diff.added {
                self.store.get_citizen(import_id, relative_id)?;
            }
            *stage = UpdateStage::RelativesDiffed;
            debug!(
                import_id,
                citizen_id,
                removed = ?diff.removed,
                added = ?diff.added,
                edges = diff.len(),
                "relatives diffed"
            );

            self.propagate(import_id, citizen_id, &diff)?;
            *stage = UpdateStage::RelativesPropagated;
        }

        let updated = self.persist(import_id, citizen_id, &patch)?;
        *stage = UpdateStage::Persisted;
        Ok(updated)
    }

    /// Mirrors `diff` onto the other end of every changed edge.
    fn propagate(&self, import_id: u64, citizen_id: u64, diff: &RelativesDiff) -> ServiceResult<()> {
        let removals = diff.removed.iter().map(|&rid| (rid, false));
        let additions = diff.added.iter().map(|&rid| (rid, true));

        for (applied, (relative_id, add)) in removals.chain(additions).enumerate() {
            let outcome = if add {
                self.store.add_relative(import_id, relative_id, citizen_id)
            } else {
                self.store.remove_relative(import_id, relative_id, citizen_id)
            };

            match outcome {
                Ok(()) => debug!(
                    event = %Event::RelativeEdgeApplied,
                    import_id,
                    citizen_id,
                    relative_id,
                    add,
                    "relative edge applied"
                ),
                Err(e) if e.is_not_found() => {
                    return Err(ServiceError::RelativesPartiallyUpdated {
                        import_id,
                        citizen_id,
                        relative_id,
                        applied,
                    })
                }
                Err(e) => return Err(ServiceError::Storage(e)),
            }
        }
        Ok(())
    }

    fn persist(&self, import_id: u64, citizen_id: u64, patch: &CitizenPatch) -> ServiceResult<Citizen> {
        Ok(self.store.set_citizen_fields(import_id, citizen_id, patch)?)
    }
}
