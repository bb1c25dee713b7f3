//! Citizen record model
//!
//! The declared field table drives record validation; the typed structs are
//! built only from records that already passed it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::fields::{parse_birth_date, FieldRule};

/// A declared citizen field: name and the rule its value must pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub rule: FieldRule,
}

impl FieldDef {
    const fn new(name: &'static str, rule: FieldRule) -> Self {
        Self { name, rule }
    }
}

/// Field carrying the citizen identifier
pub const CITIZEN_ID: &str = "citizen_id";

/// Field carrying the relatives list
pub const RELATIVES: &str = "relatives";

/// Every recognized citizen field, in declared order.
///
/// Validation walks this table front to back, so the first failing field in
/// this order is the one reported.
pub const CITIZEN_FIELDS: [FieldDef; 9] = [
    FieldDef::new(CITIZEN_ID, FieldRule::PositiveInteger),
    FieldDef::new("town", FieldRule::AddressString),
    FieldDef::new("street", FieldRule::AddressString),
    FieldDef::new("building", FieldRule::AddressString),
    FieldDef::new("apartment", FieldRule::PositiveInteger),
    FieldDef::new("name", FieldRule::Name),
    FieldDef::new("birth_date", FieldRule::BirthDate),
    FieldDef::new("gender", FieldRule::Gender),
    FieldDef::new(RELATIVES, FieldRule::Relatives),
];

/// Looks up a declared field by name.
pub fn field_def(name: &str) -> Option<&'static FieldDef> {
    CITIZEN_FIELDS.iter().find(|def| def.name == name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// A stored citizen.
///
/// `birth_date` keeps the textual form it was imported with so responses
/// echo exactly what the client sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Citizen {
    pub citizen_id: u64,
    pub town: String,
    pub street: String,
    pub building: String,
    pub apartment: u64,
    pub name: String,
    pub birth_date: String,
    pub gender: Gender,
    pub relatives: Vec<u64>,
}

impl Citizen {
    /// Parsed birth date, or `None` if the stored text is not a date.
    pub fn birth_date(&self) -> Option<NaiveDate> {
        parse_birth_date(&self.birth_date).ok()
    }

    pub fn has_relative(&self, citizen_id: u64) -> bool {
        self.relatives.contains(&citizen_id)
    }

    /// Overwrites every field present in `patch`.
    pub fn apply(&mut self, patch: &CitizenPatch) {
        if let Some(town) = &patch.town {
            self.town = town.clone();
        }
        if let Some(street) = &patch.street {
            self.street = street.clone();
        }
        if let Some(building) = &patch.building {
            self.building = building.clone();
        }
        if let Some(apartment) = patch.apartment {
            self.apartment = apartment;
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(birth_date) = &patch.birth_date {
            self.birth_date = birth_date.clone();
        }
        if let Some(gender) = patch.gender {
            self.gender = gender;
        }
        if let Some(relatives) = &patch.relatives {
            self.relatives = relatives.clone();
        }
    }
}

/// Partial citizen update. `citizen_id` is immutable and has no slot here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CitizenPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apartment: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relatives: Option<Vec<u64>>,
}

impl CitizenPatch {
    /// Patch touching only the relatives list
    pub fn relatives(relatives: Vec<u64>) -> Self {
        Self {
            relatives: Some(relatives),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
