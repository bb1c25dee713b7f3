//! Batch consistency checks for an import
//!
//! Runs over records that already passed field validation and enforces the
//! cross-record invariants:
//! - every `citizen_id` appears once
//! - no citizen lists itself, unless allowed
//! - every relative is itself a citizen of the batch
//! - relative edges are symmetric: B in A's relatives implies A in B's
//!
//! Errors are reported in that fixed order; only the first is returned.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::schema::Citizen;

/// A batch broke a cross-record invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("Non unique citizen_id `{0}`")]
    NonUniqueCitizenId(u64),

    #[error("Citizen `{0}` lists itself as a relative")]
    SelfRelative(u64),

    #[error("There are {0} non existent relatives")]
    NonExistentRelatives(usize),

    #[error("Invalid relatives for `{0}`")]
    InvalidRelatives(u64),
}

/// Result type for batch checks
pub type BatchResult<T> = Result<T, BatchError>;

/// Checks the relatives graph of a whole batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchChecker {
    allow_self_relative: bool,
}

impl BatchChecker {
    pub fn new(allow_self_relative: bool) -> Self {
        Self {
            allow_self_relative,
        }
    }

    /// Checks `citizens` as one batch.
    ///
    /// A relative may be listed before the citizen it names appears, so
    /// existence and symmetry are judged against the complete batch, never
    /// against visitation order.
    pub fn check(&self, citizens: &[Citizen]) -> BatchResult<()> {
        let mut relatives_by_id: HashMap<u64, HashSet<u64>> =
            HashMap::with_capacity(citizens.len());

        for citizen in citizens {
            let id = citizen.citizen_id;
            if relatives_by_id.contains_key(&id) {
                return Err(BatchError::NonUniqueCitizenId(id));
            }
            relatives_by_id.insert(id, citizen.relatives.iter().copied().collect());
        }

        if !self.allow_self_relative {
            if let Some(citizen) = citizens.iter().find(|c| c.has_relative(c.citizen_id)) {
                return Err(BatchError::SelfRelative(citizen.citizen_id));
            }
        }

        let missing: HashSet<u64> = citizens
            .iter()
            .flat_map(|c| c.relatives.iter().copied())
            .filter(|rid| !relatives_by_id.contains_key(rid))
            .collect();
        if !missing.is_empty() {
            return Err(BatchError::NonExistentRelatives(missing.len()));
        }

        for citizen in citizens {
            let id = citizen.citizen_id;
            let symmetric = citizen.relatives.iter().all(|rid| {
                relatives_by_id
                    .get(rid)
                    .is_some_and(|theirs| theirs.contains(&id))
            });
            if !symmetric {
                return Err(BatchError::InvalidRelatives(id));
            }
        }

        Ok(())
    }
}
