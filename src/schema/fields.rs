//! Field rules for citizen records
//!
//! Each rule takes a raw JSON value and either accepts it or names the
//! reason it failed. Rules compose: `relatives` is a unique list of
//! positive integers, `birth_date` is a string with a date shape.
//!
//! Rules never coerce. `1.0`, `true` and `"1"` are not integers.

use std::collections::HashSet;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use super::errors::{FieldError, FieldResult};

/// Upper bound on string length, in characters
pub const MAX_STRING_LENGTH: usize = 256;

/// Accepted `gender` literals
pub const GENDERS: [&str; 2] = ["male", "female"];

/// `chrono` format matching the textual birth date shape
pub const BIRTH_DATE_FORMAT: &str = "%d.%m.%Y";

/// Rule attached to a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Integer strictly greater than zero
    PositiveInteger,
    /// Bounded string with at least one letter or digit
    AddressString,
    /// Non-empty bounded string, any characters
    Name,
    /// One of [`GENDERS`], case-sensitive
    Gender,
    /// `d.m.yyyy` date strictly before today
    BirthDate,
    /// List of unique positive integers
    Relatives,
}

impl FieldRule {
    /// Checks `value` against this rule. `today` bounds birth dates.
    pub fn check(&self, value: &Value, today: NaiveDate) -> FieldResult<()> {
        match self {
            FieldRule::PositiveInteger => positive_integer(value).map(drop),
            FieldRule::AddressString => address_string(value).map(drop),
            FieldRule::Name => bounded_string(value, 1, MAX_STRING_LENGTH).map(drop),
            FieldRule::Gender => one_of(value, &GENDERS).map(drop),
            FieldRule::BirthDate => birth_date(value, today).map(drop),
            FieldRule::Relatives => unique_positive_integers(value).map(drop),
        }
    }
}

/// Accepts a JSON integer greater than zero.
pub fn positive_integer(value: &Value) -> FieldResult<u64> {
    match value {
        Value::Number(n) => match n.as_u64() {
            Some(0) => Err(FieldError::NotPositive),
            Some(v) => Ok(v),
            None if n.is_i64() => Err(FieldError::NotPositive),
            None => Err(type_error("int", value)),
        },
        _ => Err(type_error("int", value)),
    }
}

/// Accepts any JSON string.
pub fn string(value: &Value) -> FieldResult<&str> {
    value.as_str().ok_or_else(|| type_error("str", value))
}

/// Accepts a string whose character count lies within `min..=max`.
pub fn bounded_string(value: &Value, min: usize, max: usize) -> FieldResult<&str> {
    let s = string(value)?;
    let len = s.chars().count();
    if min > 0 && len < min {
        return Err(FieldError::TooShort(min));
    }
    if len > max {
        return Err(FieldError::TooLong(max));
    }
    Ok(s)
}

/// Accepts a bounded string carrying at least one letter or digit.
pub fn address_string(value: &Value) -> FieldResult<&str> {
    let s = bounded_string(value, 0, MAX_STRING_LENGTH)?;
    if !s.chars().any(char::is_alphanumeric) {
        return Err(FieldError::LetterOrDigitRequired);
    }
    Ok(s)
}

/// Accepts a string equal to one of `allowed`.
pub fn one_of<'a>(value: &'a Value, allowed: &[&str]) -> FieldResult<&'a str> {
    let s = string(value)?;
    if !allowed.contains(&s) {
        return Err(FieldError::UnexpectedValue {
            value: s.to_string(),
            expected: allowed.join(", "),
        });
    }
    Ok(s)
}

fn birth_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<day>[0-9]{1,2})\.(?P<month>[0-9]{1,2})\.(?P<year>[0-9]{4})$")
            .expect("birth date pattern compiles")
    })
}

/// Parses the `d.m.yyyy` textual date shape into a calendar date.
///
/// Day and month take one or two digits, the year exactly four.
pub fn parse_birth_date(s: &str) -> FieldResult<NaiveDate> {
    let caps = birth_date_pattern()
        .captures(s)
        .ok_or(FieldError::InvalidDateFormat)?;
    let part = |name: &str| -> FieldResult<u32> {
        caps[name]
            .parse()
            .map_err(|_| FieldError::InvalidDateFormat)
    };
    let (day, month, year) = (part("day")?, part("month")?, part("year")?);
    // year has exactly four ASCII digits, so it always fits in i32
    NaiveDate::from_ymd_opt(year as i32, month, day).ok_or(FieldError::InvalidCalendarDate)
}

/// Accepts a birth date string describing a day strictly before `today`.
pub fn birth_date(value: &Value, today: NaiveDate) -> FieldResult<NaiveDate> {
    let date = parse_birth_date(string(value)?)?;
    if date >= today {
        return Err(FieldError::NotInPast);
    }
    Ok(date)
}

/// Accepts a list of positive integers with no repeats.
pub fn unique_positive_integers(value: &Value) -> FieldResult<Vec<u64>> {
    let items = value.as_array().ok_or_else(|| type_error("list", value))?;

    let mut ids = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let id = positive_integer(item).map_err(|reason| FieldError::InvalidElement {
            index,
            reason: Box::new(reason),
        })?;
        ids.push(id);
    }

    let distinct: HashSet<u64> = ids.iter().copied().collect();
    if distinct.len() != ids.len() {
        return Err(FieldError::DuplicateElements);
    }
    Ok(ids)
}

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

fn type_error(expected: &'static str, actual: &Value) -> FieldError {
    FieldError::InvalidType {
        expected,
        got: json_type_name(actual),
    }
}
