//! Citizen schema subsystem
//!
//! Field rules, the declared citizen field table and the record validator
//! that gates every import and update.
//!
//! # Design Principles
//!
//! - One declared table of (field, rule), walked in order
//! - No nulls, defaults, or coercion
//! - Unknown fields always rejected
//! - Deterministic first-failure reporting

mod errors;
pub mod fields;
mod types;
mod validator;

pub use errors::{FieldError, FieldResult, RecordError, SchemaResult};
pub use fields::{FieldRule, BIRTH_DATE_FORMAT, GENDERS, MAX_STRING_LENGTH};
pub use types::{field_def, Citizen, CitizenPatch, FieldDef, Gender, CITIZEN_FIELDS, CITIZEN_ID, RELATIVES};
pub use validator::CitizenValidator;
