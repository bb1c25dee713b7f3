//! Shared fixtures for integration tests

#![allow(dead_code)]

use chrono::{Duration, Utc};
use serde_json::{json, Value};

use citizens::schema::BIRTH_DATE_FORMAT;

/// Birth date `days` before today, formatted for the API.
pub fn days_ago(days: i64) -> String {
    (Utc::now().date_naive() - Duration::days(days))
        .format(BIRTH_DATE_FORMAT)
        .to_string()
}

/// A valid citizen record with the given relatives.
pub fn record(citizen_id: u64, relatives: &[u64]) -> Value {
    record_born(citizen_id, relatives, &days_ago(30 * 365))
}

pub fn record_born(citizen_id: u64, relatives: &[u64], birth_date: &str) -> Value {
    json!({
        "citizen_id": citizen_id,
        "town": "Москва",
        "street": "Льва Толстого",
        "building": "16к7стр5",
        "apartment": 7,
        "name": "Иванов Иван Иванович",
        "birth_date": birth_date,
        "gender": "male",
        "relatives": relatives
    })
}

pub fn import_body(records: Vec<Value>) -> Value {
    json!({ "citizens": records })
}
