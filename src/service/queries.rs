//! Read-side queries over one import

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::schema::Citizen;
use crate::stats::{age_in_years, percentile, round2};
use crate::storage::StorageError;

use super::errors::ServiceResult;
use super::ImportService;

/// Presents per month 1..=12, keyed by month number.
pub type Birthdays = BTreeMap<u32, Vec<Presents>>;

/// How many presents one citizen buys in a month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presents {
    pub citizen_id: u64,
    pub presents: u32,
}

/// Age percentiles for one town
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TownAgeStats {
    pub town: String,
    pub p50: f64,
    pub p75: f64,
    pub p99: f64,
}

impl ImportService {
    /// Every citizen of an import, in import order.
    pub fn citizens(&self, import_id: u64) -> ServiceResult<Vec<Citizen>> {
        Ok(self.store.list_citizens(import_id)?)
    }

    /// Presents each citizen buys per month, one per relative born that month.
    ///
    /// All twelve months are present; a month lists only citizens with at
    /// least one present in it, in import order.
    pub fn birthdays(&self, import_id: u64) -> ServiceResult<Birthdays> {
        let citizens = self.store.list_citizens(import_id)?;

        let mut birth_months = HashMap::with_capacity(citizens.len());
        for citizen in &citizens {
            birth_months.insert(citizen.citizen_id, birth_month(citizen)?);
        }

        let mut birthdays: Birthdays = (1..=12).map(|month| (month, Vec::new())).collect();
        for citizen in &citizens {
            let mut per_month: BTreeMap<u32, u32> = BTreeMap::new();
            for relative_id in &citizen.relatives {
                let month = birth_months.get(relative_id).ok_or_else(|| {
                    StorageError::Corrupted(format!(
                        "citizen {} lists missing relative {} in import {}",
                        citizen.citizen_id, relative_id, import_id
                    ))
                })?;
                *per_month.entry(*month).or_default() += 1;
            }
            for (month, presents) in per_month {
                birthdays.entry(month).or_default().push(Presents {
                    citizen_id: citizen.citizen_id,
                    presents,
                });
            }
        }

        Ok(birthdays)
    }

    /// p50/p75/p99 of citizen ages per town, towns sorted by name.
    pub fn age_percentiles(&self, import_id: u64) -> ServiceResult<Vec<TownAgeStats>> {
        let citizens = self.store.list_citizens(import_id)?;
        let today = self.validator.today();

        let mut ages_by_town: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for citizen in &citizens {
            let born = citizen
                .birth_date()
                .ok_or_else(|| corrupted_birth_date(citizen))?;
            ages_by_town
                .entry(citizen.town.as_str())
                .or_default()
                .push(f64::from(age_in_years(born, today)));
        }

        Ok(ages_by_town
            .into_iter()
            .map(|(town, ages)| {
                let at = |p: f64| percentile(&ages, p).map(round2).unwrap_or_default();
                TownAgeStats {
                    town: town.to_string(),
                    p50: at(50.0),
                    p75: at(75.0),
                    p99: at(99.0),
                }
            })
            .collect())
    }
}

fn birth_month(citizen: &Citizen) -> Result<u32, StorageError> {
    use chrono::Datelike;

    citizen
        .birth_date()
        .map(|date| date.month())
        .ok_or_else(|| corrupted_birth_date(citizen))
}

fn corrupted_birth_date(citizen: &Citizen) -> StorageError {
    StorageError::Corrupted(format!(
        "citizen {} has unreadable birth_date `{}`",
        citizen.citizen_id, citizen.birth_date
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::schema::{CitizenValidator, Gender};
    use crate::service::{ImportConfig, ServiceError};
    use crate::storage::{CitizenStore, MemoryStore};

    fn citizen(citizen_id: u64, town: &str, birth_date: &str, relatives: &[u64]) -> Citizen {
        Citizen {
            citizen_id,
            town: town.into(),
            street: "Иосифа Бродского".into(),
            building: "2".into(),
            apartment: 11,
            name: "Романова Мария Леонидовна".into(),
            birth_date: birth_date.into(),
            gender: Gender::Female,
            relatives: relatives.to_vec(),
        }
    }

    fn service(citizens: &[Citizen]) -> ImportService {
        let store = Arc::new(MemoryStore::new());
        store.write_batch(1, citizens).unwrap();
        ImportService::new(store, ImportConfig::default())
    }

    #[test]
    fn test_birthdays_has_every_month() {
        let birthdays = service(&[citizen(1, "A", "01.01.2000", &[])])
            .birthdays(1)
            .unwrap();
        assert_eq!(birthdays.len(), 12);
        assert!(birthdays.values().all(Vec::is_empty));
    }

    #[test]
    fn test_birthdays_counts_relatives_months() {
        let service = service(&[
            citizen(1, "A", "31.12.1986", &[2, 3]),
            citizen(2, "A", "11.04.1990", &[1]),
            citizen(3, "A", "03.04.2000", &[1]),
        ]);
        let birthdays = service.birthdays(1).unwrap();

        assert_eq!(
            birthdays[&4],
            vec![Presents {
                citizen_id: 1,
                presents: 2
            }]
        );
        assert_eq!(
            birthdays[&12],
            vec![
                Presents {
                    citizen_id: 2,
                    presents: 1
                },
                Presents {
                    citizen_id: 3,
                    presents: 1
                },
            ]
        );
        assert!(birthdays[&1].is_empty());
    }

    #[test]
    fn test_birthdays_serialize_with_string_keys() {
        let birthdays = service(&[citizen(1, "A", "01.06.2000", &[])])
            .birthdays(1)
            .unwrap();
        let json = serde_json::to_value(&birthdays).unwrap();
        assert!(json.get("1").is_some());
        assert!(json.get("12").is_some());
    }

    #[test]
    fn test_age_percentiles_per_town() {
        let today = NaiveDate::from_ymd_opt(2019, 8, 13).unwrap();
        let service = service(&[
            citizen(1, "Москва", "13.08.1999", &[]),
            citizen(2, "Керчь", "13.08.1959", &[]),
            citizen(3, "Москва", "13.08.1989", &[]),
            citizen(4, "Москва", "13.08.1979", &[]),
            citizen(5, "Керчь", "14.08.1949", &[]),
        ])
        .with_validator(CitizenValidator::with_today(today));

        let stats = service.age_percentiles(1).unwrap();
        assert_eq!(
            stats,
            vec![
                TownAgeStats {
                    town: "Керчь".into(),
                    p50: 64.5,
                    p75: 66.75,
                    p99: 68.91,
                },
                TownAgeStats {
                    town: "Москва".into(),
                    p50: 30.0,
                    p75: 35.0,
                    p99: 39.8,
                },
            ]
        );
    }

    #[test]
    fn test_unknown_import() {
        let service = service(&[]);
        assert!(matches!(service.birthdays(2), Err(ServiceError::NotFound(_))));
        assert!(matches!(service.age_percentiles(2), Err(ServiceError::NotFound(_))));
        assert!(matches!(service.citizens(2), Err(ServiceError::NotFound(_))));
        assert!(service.age_percentiles(1).unwrap().is_empty());
    }
}
