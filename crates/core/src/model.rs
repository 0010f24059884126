//! In-memory data model for patients, records, facilities and rounds.
//!
//! Every aggregate is a plain value. State changes elsewhere in the crate build new values
//! instead of mutating these in place, so the types only derive `Clone` and serde support.

use crate::NonEmptyText;
use serde::{Deserialize, Serialize};

// ============================================================================
// Clinical data
// ============================================================================

/// SOAP note text block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Soap {
    pub subjective: String,
    pub objective: String,
    pub assessment: String,
    pub plan: String,
}

/// One medication row.
///
/// `status` is kept as free text (開始, 継続, 中止, 変更 in practice); unknown values are
/// preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Medication {
    pub name: String,
    pub dose: String,
    pub route: String,
    pub frequency: String,
    pub status: String,
    pub reason_or_note: String,
}

/// Pharmacist-oriented block: medications plus monitoring and education lists.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PharmacyFocus {
    pub medications: Vec<Medication>,
    pub adherence: String,
    pub side_effects: Vec<String>,
    pub drug_related_problems: Vec<String>,
    pub labs_and_monitoring: Vec<String>,
    pub patient_education: Vec<String>,
    pub follow_up: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alerts {
    pub red_flags: Vec<String>,
    pub need_to_contact_physician: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub main_problems: Vec<String>,
    pub note_for_pharmacy: String,
}

/// AI-generated summary of one encounter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalData {
    pub soap: Soap,
    pub pharmacy_focus: PharmacyFocus,
    pub alerts: Alerts,
    pub meta: Meta,
}

// ============================================================================
// Patients and records
// ============================================================================

/// Review state of a record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Approved,
    #[default]
    Pending,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: NonEmptyText,
    /// ISO-like date, optionally with a time (`YYYY-MM-DD` or `YYYY-MM-DD HH:mm`).
    pub date: String,
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub clinical_data: ClinicalData,
    #[serde(default)]
    pub status: RecordStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Japanese display label.
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "男性",
            Gender::Female => "女性",
        }
    }
}

/// A patient with their records, most recent first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: NonEmptyText,
    pub name: String,
    #[serde(default)]
    pub kana: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub age: u32,
    pub gender: Gender,
    #[serde(default)]
    pub avatar_color: String,
    #[serde(default)]
    pub records: Vec<Record>,
}

impl Patient {
    /// The first record, which the data treats as the most recent visit.
    pub fn latest_record(&self) -> Option<&Record> {
        self.records.first()
    }

    /// Date of the latest record, or `""` for a patient without records.
    pub fn latest_record_date(&self) -> &str {
        self.latest_record().map(|r| r.date.as_str()).unwrap_or("")
    }

    /// True when any record still awaits approval.
    pub fn has_pending(&self) -> bool {
        self.records
            .iter()
            .any(|r| r.status == RecordStatus::Pending)
    }

    pub fn find_record(&self, record_id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id.as_str() == record_id)
    }

    /// First character of the kana reading, used as the avatar initial.
    pub fn initial(&self) -> Option<char> {
        self.kana.chars().next()
    }
}

/// Looks up a patient by id.
pub fn find_patient<'a>(patients: &'a [Patient], patient_id: &str) -> Option<&'a Patient> {
    patients.iter().find(|p| p.id.as_str() == patient_id)
}

// ============================================================================
// Facilities and rounds
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilityKind {
    /// Residential care facility with rooms.
    Facility,
    /// Group of private homes visited on one round.
    Home,
}

/// A patient registered on a facility roster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterPatient {
    pub id: NonEmptyText,
    pub name: String,
    #[serde(default)]
    pub kana: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub id: NonEmptyText,
    pub name: String,
    pub kind: FacilityKind,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub roster: Vec<RosterPatient>,
}

impl Facility {
    pub fn find_roster_patient(&self, roster_patient_id: &str) -> Option<&RosterPatient> {
        self.roster
            .iter()
            .find(|p| p.id.as_str() == roster_patient_id)
    }
}

/// One transcribed encounter inside a round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSegment {
    pub id: NonEmptyText,
    pub order: u32,
    /// Name guessed from the recording, shown until a roster patient is linked.
    pub predicted_name: String,
    pub transcript: String,
    pub clinical_data: ClinicalData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_patient_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub id: NonEmptyText,
    pub date: String,
    /// Free-form label such as 午前 or 午後.
    pub timeframe: String,
    pub facility_id: String,
    pub segments: Vec<RoundSegment>,
}

impl Round {
    /// Segments ordered by their `order` field; ties keep their stored order.
    pub fn ordered_segments(&self) -> Vec<&RoundSegment> {
        let mut segments: Vec<&RoundSegment> = self.segments.iter().collect();
        segments.sort_by_key(|s| s.order);
        segments
    }

    pub fn find_segment(&self, segment_id: &str) -> Option<&RoundSegment> {
        self.segments.iter().find(|s| s.id.as_str() == segment_id)
    }
}

pub fn find_facility<'a>(facilities: &'a [Facility], facility_id: &str) -> Option<&'a Facility> {
    facilities.iter().find(|f| f.id.as_str() == facility_id)
}

pub fn find_round<'a>(rounds: &'a [Round], round_id: &str) -> Option<&'a Round> {
    rounds.iter().find(|r| r.id.as_str() == round_id)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn id(value: &str) -> NonEmptyText {
        NonEmptyText::new(value).expect("test id")
    }

    pub fn record(record_id: &str, date: &str, status: RecordStatus) -> Record {
        Record {
            id: id(record_id),
            date: date.into(),
            transcript: String::new(),
            clinical_data: ClinicalData::default(),
            status,
        }
    }

    pub fn patient(patient_id: &str, name: &str, kana: &str, records: Vec<Record>) -> Patient {
        Patient {
            id: id(patient_id),
            name: name.into(),
            kana: kana.into(),
            birth_date: "1950-01-01".into(),
            age: 75,
            gender: Gender::Female,
            avatar_color: "#14b8a6".into(),
            records,
        }
    }

    pub fn segment(segment_id: &str, order: u32, suggested: Option<&str>) -> RoundSegment {
        RoundSegment {
            id: id(segment_id),
            order,
            predicted_name: format!("{segment_id}さん？"),
            transcript: String::new(),
            clinical_data: ClinicalData::default(),
            suggested_patient_id: suggested.map(str::to_string),
        }
    }

    pub fn round(round_id: &str, date: &str, facility_id: &str, segments: Vec<RoundSegment>) -> Round {
        Round {
            id: id(round_id),
            date: date.into(),
            timeframe: "午前".into(),
            facility_id: facility_id.into(),
            segments,
        }
    }

    pub fn facility(facility_id: &str, roster: &[(&str, &str)]) -> Facility {
        Facility {
            id: id(facility_id),
            name: "さくら苑".into(),
            kind: FacilityKind::Facility,
            address: String::new(),
            roster: roster
                .iter()
                .map(|(rid, name)| RosterPatient {
                    id: id(rid),
                    name: (*name).into(),
                    kana: String::new(),
                    room: None,
                    note: None,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn latest_record_is_first_record() {
        let p = patient(
            "p1",
            "田中 健",
            "タナカ ケン",
            vec![
                record("r2", "2025-11-12", RecordStatus::Approved),
                record("r1", "2025-10-01", RecordStatus::Pending),
            ],
        );
        assert_eq!(p.latest_record_date(), "2025-11-12");
        assert!(p.has_pending());
        assert_eq!(p.initial(), Some('タ'));
        assert!(p.find_record("r1").is_some());
        assert!(p.find_record("missing").is_none());
    }

    #[test]
    fn patient_without_records_has_empty_latest_date() {
        let p = patient("p2", "佐藤 博", "サトウ ヒロシ", vec![]);
        assert_eq!(p.latest_record_date(), "");
        assert!(!p.has_pending());
    }

    #[test]
    fn segments_are_ordered_by_order_field() {
        let r = round(
            "r1",
            "2025-11-12",
            "f1",
            vec![segment("s2", 2, None), segment("s1", 1, None)],
        );
        let ids: Vec<&str> = r.ordered_segments().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2"]);
    }

    #[test]
    fn record_status_serialises_lowercase() {
        let json = serde_json::to_string(&RecordStatus::Approved).expect("serialise");
        assert_eq!(json, "\"approved\"");
    }
}
