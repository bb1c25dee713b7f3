//! Schema error types
//!
//! Two layers:
//! - `FieldError`: a single value broke its field rule
//! - `RecordError`: a citizen record broke the schema, naming the field

use thiserror::Error;

/// A single field value failed its rule.
///
/// Never produced by coercion: a value either passes untouched or fails with
/// one of these reasons.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("invalid type (`{expected}` expected, got `{got}`)")]
    InvalidType {
        expected: &'static str,
        got: &'static str,
    },

    #[error("value must be > 0")]
    NotPositive,

    #[error("too short value. Minimum {0} symbols expected")]
    TooShort(usize),

    #[error("too long value. Maximum {0} symbols expected")]
    TooLong(usize),

    #[error("at least one digit or letter required")]
    LetterOrDigitRequired,

    #[error("unexpected value `{value}`. Expected values: {expected}")]
    UnexpectedValue { value: String, expected: String },

    #[error("invalid format. `dd.mm.yyyy` expected")]
    InvalidDateFormat,

    #[error("no such calendar date")]
    InvalidCalendarDate,

    #[error("value must be earlier than today")]
    NotInPast,

    #[error("elements must be unique")]
    DuplicateElements,

    #[error("element {index} is invalid: {reason}")]
    InvalidElement {
        index: usize,
        reason: Box<FieldError>,
    },
}

/// Result type for field rules
pub type FieldResult<T> = Result<T, FieldError>;

/// A citizen record failed schema validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("citizen data must be an object, got `{0}`")]
    NotAnObject(&'static str),

    #[error("Field `{0}` is unknown")]
    UnknownField(String),

    #[error("Field `{0}` is required")]
    MissingField(&'static str),

    #[error("Field `{field}` is invalid: {reason}")]
    InvalidField {
        field: &'static str,
        reason: FieldError,
    },

    #[error("Forbidden to update field `{0}`")]
    ImmutableField(&'static str),

    #[error("citizen data does not match the record shape: {0}")]
    Malformed(String),
}

impl RecordError {
    /// Name of the offending field, when the failure is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            RecordError::NotAnObject(_) | RecordError::Malformed(_) => None,
            RecordError::UnknownField(name) => Some(name),
            RecordError::MissingField(name) => Some(name),
            RecordError::InvalidField { field, .. } => Some(field),
            RecordError::ImmutableField(name) => Some(name),
        }
    }
}

/// Result type for record validation
pub type SchemaResult<T> = Result<T, RecordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_field_names_field_and_reason() {
        let err = RecordError::InvalidField {
            field: "apartment",
            reason: FieldError::NotPositive,
        };
        assert_eq!(err.to_string(), "Field `apartment` is invalid: value must be > 0");
        assert_eq!(err.field(), Some("apartment"));
    }

    #[test]
    fn test_element_error_nests_reason() {
        let err = FieldError::InvalidElement {
            index: 1,
            reason: Box::new(FieldError::InvalidType {
                expected: "int",
                got: "string",
            }),
        };
        let display = err.to_string();
        assert!(display.contains("element 1"));
        assert!(display.contains("`int` expected"));
    }

    #[test]
    fn test_not_an_object_has_no_field() {
        assert_eq!(RecordError::NotAnObject("array").field(), None);
    }
}
