//! Citizen record validator
//!
//! Validation semantics:
//! - Unrecognized fields are rejected, always
//! - With `all_fields_required`, every declared field must be present
//! - Every present field passes its rule from `CITIZEN_FIELDS`
//! - The first failure in declared order is reported
//!
//! The validator is a gate: it never rewrites the record it inspects.

use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::errors::{RecordError, SchemaResult};
use super::fields::json_type_name;
use super::types::{Citizen, CitizenPatch, CITIZEN_FIELDS, CITIZEN_ID};

/// Validates citizen records against the fixed citizen schema.
///
/// Holds no per-record state, so one validator can be shared across
/// requests. Birth dates are checked against the current UTC date at the
/// moment of each call unless a date is pinned with [`with_today`].
///
/// [`with_today`]: CitizenValidator::with_today
#[derive(Debug, Clone, Copy, Default)]
pub struct CitizenValidator {
    today: Option<NaiveDate>,
}

impl CitizenValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator that treats `today` as the current date.
    pub fn with_today(today: NaiveDate) -> Self {
        Self { today: Some(today) }
    }

    /// The date birth dates are judged against.
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Validates a raw record and returns it untouched.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` if:
    /// - the record is not a JSON object
    /// - it carries a field outside the schema
    /// - a declared field is missing while `all_fields_required` is set
    /// - a present field fails its rule
    pub fn validate<'v>(
        &self,
        data: &'v Value,
        all_fields_required: bool,
    ) -> SchemaResult<&'v Map<String, Value>> {
        let record = data
            .as_object()
            .ok_or_else(|| RecordError::NotAnObject(json_type_name(data)))?;

        if let Some(unknown) = record
            .keys()
            .find(|key| !CITIZEN_FIELDS.iter().any(|def| def.name == key.as_str()))
        {
            return Err(RecordError::UnknownField(unknown.clone()));
        }

        let today = self.today();
        for def in &CITIZEN_FIELDS {
            match record.get(def.name) {
                Some(value) => {
                    def.rule
                        .check(value, today)
                        .map_err(|reason| RecordError::InvalidField {
                            field: def.name,
                            reason,
                        })?;
                }
                None if all_fields_required => return Err(RecordError::MissingField(def.name)),
                None => {}
            }
        }

        Ok(record)
    }

    /// Validates a complete record and decodes it.
    pub fn validate_citizen(&self, data: &Value) -> SchemaResult<Citizen> {
        let record = self.validate(data, true)?;
        decode(record)
    }

    /// Validates a partial update and decodes it.
    ///
    /// `citizen_id` is rejected before any field rule runs.
    pub fn validate_patch(&self, data: &Value) -> SchemaResult<CitizenPatch> {
        if data.get(CITIZEN_ID).is_some() {
            return Err(RecordError::ImmutableField(CITIZEN_ID));
        }
        let record = self.validate(data, false)?;
        decode(record)
    }
}

fn decode<T: DeserializeOwned>(record: &Map<String, Value>) -> SchemaResult<T> {
    serde_json::from_value(Value::Object(record.clone()))
        .map_err(|e| RecordError::Malformed(e.to_string()))
}
