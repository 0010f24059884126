//! Patient list search and ordering.

use crate::model::Patient;
use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ordering applied to the patient list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Most recent visit first.
    #[default]
    Date,
    /// Id ascending, ignoring case; exact byte order breaks ties.
    Id,
    /// Kana reading, ascending.
    Name,
}

impl std::str::FromStr for SortKey {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim() {
            "date" => Ok(SortKey::Date),
            "id" => Ok(SortKey::Id),
            "name" => Ok(SortKey::Name),
            other => Err(CoreError::InvalidInput(format!(
                "unknown sort key '{other}' (expected date, id or name)"
            ))),
        }
    }
}

/// True when `query` (already lower-cased and trimmed) matches name, kana or id.
fn matches(patient: &Patient, query: &str) -> bool {
    patient.name.to_lowercase().contains(query)
        || patient.kana.to_lowercase().contains(query)
        || patient.id.as_str().to_lowercase().contains(query)
}

fn compare(a: &Patient, b: &Patient, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => b.latest_record_date().cmp(a.latest_record_date()),
        SortKey::Id => a
            .id
            .as_str()
            .to_lowercase()
            .cmp(&b.id.as_str().to_lowercase())
            .then_with(|| a.id.cmp(&b.id)),
        SortKey::Name => a.kana.cmp(&b.kana),
    }
}

/// Filters `patients` by a free-text query and orders the matches.
///
/// The query is trimmed and compared case-insensitively against name, kana and id; a blank
/// query keeps every patient. Sorting is stable, so patients that compare equal keep their
/// input order. Patients without records have an empty latest date and therefore sort last
/// under [`SortKey::Date`].
pub fn filter_and_sort<'a>(patients: &'a [Patient], query: &str, key: SortKey) -> Vec<&'a Patient> {
    let query = query.trim().to_lowercase();

    let mut result: Vec<&Patient> = if query.is_empty() {
        patients.iter().collect()
    } else {
        patients.iter().filter(|p| matches(p, &query)).collect()
    };

    result.sort_by(|a, b| compare(a, b, key));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::{patient, record};
    use crate::model::RecordStatus;

    fn ids(patients: &[&Patient]) -> Vec<String> {
        patients.iter().map(|p| p.id.to_string()).collect()
    }

    fn sample() -> Vec<Patient> {
        vec![
            patient(
                "p3",
                "鈴木 一郎",
                "スズキ イチロウ",
                vec![record("r3", "2025-10-30", RecordStatus::Pending)],
            ),
            patient(
                "p1",
                "田中 健",
                "タナカ ケン",
                vec![record("r1", "2025-11-12", RecordStatus::Pending)],
            ),
            patient("p2", "佐藤 博", "サトウ ヒロシ", vec![]),
            patient(
                "P10",
                "Smith",
                "スミス",
                vec![record("r10", "2025-11-01", RecordStatus::Approved)],
            ),
        ]
    }

    #[test]
    fn date_sort_puts_patients_without_records_last() {
        let patients = vec![
            patient(
                "p1",
                "田中",
                "タナカ",
                vec![record("r1", "2025-11-01", RecordStatus::Pending)],
            ),
            patient("p2", "佐藤", "サトウ", vec![]),
        ];
        let sorted = filter_and_sort(&patients, "", SortKey::Date);
        assert_eq!(ids(&sorted), vec!["p1", "p2"]);
    }

    #[test]
    fn date_sort_is_descending() {
        let patients = sample();
        let sorted = filter_and_sort(&patients, "", SortKey::Date);
        assert_eq!(ids(&sorted), vec!["p1", "P10", "p3", "p2"]);
    }

    #[test]
    fn date_sort_is_stable_for_equal_dates() {
        let patients = vec![
            patient("b", "B", "ビー", vec![]),
            patient("a", "A", "エー", vec![]),
        ];
        let sorted = filter_and_sort(&patients, "", SortKey::Date);
        assert_eq!(ids(&sorted), vec!["b", "a"]);
    }

    #[test]
    fn id_and_name_sorts_are_ascending() {
        let patients = sample();
        assert_eq!(
            ids(&filter_and_sort(&patients, "", SortKey::Id)),
            vec!["p1", "P10", "p2", "p3"]
        );
        assert_eq!(
            ids(&filter_and_sort(&patients, "", SortKey::Name)),
            vec!["p2", "p3", "P10", "p1"]
        );
    }

    #[test]
    fn id_sort_ignores_case_and_breaks_ties_by_bytes() {
        let patients = vec![
            patient("p1", "A", "エー", vec![]),
            patient("P2", "B", "ビー", vec![]),
            patient("P1", "C", "シー", vec![]),
        ];
        assert_eq!(
            ids(&filter_and_sort(&patients, "", SortKey::Id)),
            vec!["P1", "p1", "P2"]
        );
    }

    #[test]
    fn filters_on_name_kana_and_id() {
        let patients = sample();
        assert_eq!(ids(&filter_and_sort(&patients, "田中", SortKey::Id)), vec!["p1"]);
        assert_eq!(ids(&filter_and_sort(&patients, "サトウ", SortKey::Id)), vec!["p2"]);
        assert_eq!(ids(&filter_and_sort(&patients, "p10", SortKey::Id)), vec!["P10"]);
        assert_eq!(ids(&filter_and_sort(&patients, "  smith ", SortKey::Id)), vec!["P10"]);
    }

    #[test]
    fn non_matching_query_returns_nothing() {
        let patients = sample();
        assert!(filter_and_sort(&patients, "存在しない", SortKey::Date).is_empty());
    }

    #[test]
    fn input_is_left_untouched() {
        let patients = sample();
        let before = patients.clone();
        let _ = filter_and_sort(&patients, "", SortKey::Name);
        assert_eq!(patients, before);
    }

    #[test]
    fn parses_sort_keys() {
        assert_eq!("date".parse::<SortKey>().expect("date"), SortKey::Date);
        assert_eq!("name".parse::<SortKey>().expect("name"), SortKey::Name);
        assert!(matches!(
            "kana".parse::<SortKey>(),
            Err(CoreError::InvalidInput(_))
        ));
    }
}
