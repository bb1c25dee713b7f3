//! Import orchestration
//!
//! Validation always finishes before the first write. Once the batch is
//! accepted the store gets exactly one `write_batch`; if that fails the
//! import id is deleted again before the error is returned.

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::observability::Event;
use crate::schema::Citizen;
use crate::storage::StorageError;

use super::errors::{DataValidationError, ServiceError, ServiceResult};
use super::ImportService;

/// Key holding the records inside an import body
const CITIZENS_KEY: &str = "citizens";

impl ImportService {
    /// Validates an import body without touching storage.
    ///
    /// Records are checked in order and the first invalid one fails the
    /// whole body; the batch checks run only once every record passed.
    pub fn validate_import(&self, body: &Value) -> ServiceResult<Vec<Citizen>> {
        let records = body
            .get(CITIZENS_KEY)
            .and_then(Value::as_array)
            .ok_or(DataValidationError::MissingCitizens)?;

        let citizens = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                self.validator
                    .validate_citizen(record)
                    .map_err(|source| DataValidationError::Citizen { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.checker.check(&citizens)?;
        Ok(citizens)
    }

    /// Validates and persists an import, returning its id.
    ///
    /// The id is only returned once the whole batch is stored. On a failed
    /// write the partially stored import is deleted first.
    pub fn create_import(&self, body: &Value) -> ServiceResult<u64> {
        let citizens = self.validate_import(body).map_err(|e| {
            warn!(event = %Event::ImportRejected, code = e.code(), error = %e, "import rejected");
            e
        })?;

        let import_id = self.store.generate_import_id()?;
        debug!(import_id, citizens = citizens.len(), "writing import");

        if let Err(e) = self.store.write_batch(import_id, &citizens) {
            error!(event = %Event::ImportWriteFailed, import_id, error = %e, "import write failed");
            // the id belongs to somebody else; deleting it would destroy their data
            if !matches!(e, StorageError::ImportExists(_)) {
                self.roll_back(import_id);
            }
            return Err(ServiceError::Storage(e));
        }

        info!(
            event = %Event::ImportCreated,
            import_id,
            citizens = citizens.len(),
            "import created"
        );
        Ok(import_id)
    }

    fn roll_back(&self, import_id: u64) {
        match self.store.delete_import(import_id) {
            Ok(()) => warn!(event = %Event::ImportRolledBack, import_id, "import rolled back"),
            Err(e) => error!(
                event = %Event::ImportRollbackFailed,
                import_id,
                error = %e,
                "import rollback failed"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};

    use super::*;
    use crate::batch::BatchError;
    use crate::schema::RecordError;
    use crate::service::ImportConfig;
    use crate::storage::{CitizenStore, MemoryStore};

    fn record(citizen_id: u64, relatives: &[u64]) -> Value {
        json!({
            "citizen_id": citizen_id,
            "town": "Москва",
            "street": "Льва Толстого",
            "building": "16к7стр5",
            "apartment": 7,
            "name": "Иванов Иван Иванович",
            "birth_date": "26.12.1986",
            "gender": "male",
            "relatives": relatives
        })
    }

    fn service() -> (Arc<MemoryStore>, ImportService) {
        let store = Arc::new(MemoryStore::new());
        let service = ImportService::new(store.clone(), ImportConfig::default());
        (store, service)
    }

    #[test]
    fn test_create_import_persists_batch() {
        let (store, service) = service();
        let body = json!({"citizens": [record(1, &[2]), record(2, &[1])]});

        let import_id = service.create_import(&body).unwrap();
        let stored = store.list_citizens(import_id).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].relatives, vec![2]);
    }

    #[test]
    fn test_empty_import_is_valid() {
        let (store, service) = service();
        let import_id = service.create_import(&json!({"citizens": []})).unwrap();
        assert!(store.list_citizens(import_id).unwrap().is_empty());
    }

    #[test]
    fn test_missing_citizens_envelope() {
        let (_, service) = service();
        for body in [json!({}), json!([]), json!({"citizens": {}}), json!("x")] {
            assert_eq!(
                service.create_import(&body),
                Err(ServiceError::Validation(DataValidationError::MissingCitizens))
            );
        }
    }

    #[test]
    fn test_invalid_record_reports_its_position() {
        let (store, service) = service();
        let mut bad = record(2, &[]);
        bad["apartment"] = json!(0);
        let body = json!({"citizens": [record(1, &[]), bad]});

        match service.create_import(&body) {
            Err(ServiceError::Validation(DataValidationError::Citizen { index, source })) => {
                assert_eq!(index, 1);
                assert_eq!(source.field(), Some("apartment"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(store.import_count().unwrap(), 0);
    }

    #[test]
    fn test_batch_errors_persist_nothing() {
        let (store, service) = service();

        let duplicate = json!({"citizens": [record(1, &[]), record(1, &[])]});
        assert_eq!(
            service.create_import(&duplicate),
            Err(ServiceError::Consistency(BatchError::NonUniqueCitizenId(1)))
        );

        let dangling = json!({"citizens": [record(1, &[2])]});
        assert_eq!(
            service.create_import(&dangling),
            Err(ServiceError::Consistency(BatchError::NonExistentRelatives(1)))
        );

        assert_eq!(store.import_count().unwrap(), 0);
    }

    #[test]
    fn test_unknown_field_in_record() {
        let (_, service) = service();
        let mut extra = record(1, &[]);
        extra["age"] = json!(3);

        let err = service
            .validate_import(&json!({"citizens": [extra]}))
            .unwrap_err();
        assert_eq!(err.code(), "CITIZENS_UNKNOWN_FIELD");
        assert!(matches!(
            err,
            ServiceError::Validation(DataValidationError::Citizen {
                source: RecordError::UnknownField(_),
                ..
            })
        ));
    }

    #[test]
    fn test_self_relative_follows_config() {
        let body = json!({"citizens": [record(1, &[1])]});

        let (_, strict) = service();
        assert_eq!(
            strict.create_import(&body),
            Err(ServiceError::Consistency(BatchError::SelfRelative(1)))
        );

        let relaxed = ImportService::new(
            Arc::new(MemoryStore::new()),
            ImportConfig {
                allow_self_relative: true,
            },
        );
        assert!(relaxed.create_import(&body).is_ok());
    }

    #[test]
    fn test_import_ids_are_distinct() {
        let (_, service) = service();
        let body = json!({"citizens": [record(1, &[])]});
        let first = service.create_import(&body).unwrap();
        let second = service.create_import(&body).unwrap();
        assert_ne!(first, second);
    }
}
