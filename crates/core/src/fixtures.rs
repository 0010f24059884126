//! Dataset loading.
//!
//! Patients, facilities and rounds are read from a single YAML document. Parsing goes through
//! `serde_path_to_error` so a schema mismatch names the failing field (for example
//! `rounds[0].segments[1].order`).
//!
//! A round segment may name a patient with `from_patient` instead of carrying its own
//! transcript and clinical data; it then takes both from that patient's latest record. Fields
//! given inline take precedence.

use crate::config::CoreConfig;
use crate::model::{find_patient, ClinicalData, Facility, Patient, Round, RoundSegment};
use crate::{CoreError, CoreResult, NonEmptyText};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Demonstration dataset compiled into the binary.
const DEMO_YAML: &str = include_str!("../fixtures/demo.yaml");

/// Everything the browsers operate on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dataset {
    pub patients: Vec<Patient>,
    pub facilities: Vec<Facility>,
    pub rounds: Vec<Round>,
}

impl Dataset {
    /// Parse a dataset from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::FixtureSchema`] when the YAML does not match the expected shape,
    /// [`CoreError::SourceRecordMissing`] when `from_patient` names a patient without records,
    /// and [`CoreError::InvalidFixture`] for duplicate ids or rounds pointing at unknown
    /// facilities.
    pub fn from_yaml_str(yaml_text: &str) -> CoreResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, DatasetWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>".to_string()
                } else {
                    path
                };
                return Err(CoreError::FixtureSchema {
                    path,
                    message: source.to_string(),
                });
            }
        };

        let rounds = wire
            .rounds
            .into_iter()
            .map(|round| round.resolve(&wire.patients))
            .collect::<CoreResult<Vec<_>>>()?;

        let dataset = Self {
            patients: wire.patients,
            facilities: wire.facilities,
            rounds,
        };
        dataset.validate()?;

        tracing::debug!(
            patients = dataset.patients.len(),
            facilities = dataset.facilities.len(),
            rounds = dataset.rounds.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn load(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path).map_err(CoreError::FixtureRead)?;
        Self::from_yaml_str(&text)
    }

    pub fn demo() -> CoreResult<Self> {
        Self::from_yaml_str(DEMO_YAML)
    }

    /// The configured fixture file, or the demonstration dataset when none is configured.
    pub fn from_config(cfg: &CoreConfig) -> CoreResult<Self> {
        match cfg.fixture_path() {
            Some(path) => {
                tracing::info!("loading fixtures from {}", path.display());
                Self::load(path)
            }
            None => Self::demo(),
        }
    }

    fn validate(&self) -> CoreResult<()> {
        ensure_unique("patient", self.patients.iter().map(|p| &p.id))?;
        ensure_unique("facility", self.facilities.iter().map(|f| &f.id))?;
        ensure_unique("round", self.rounds.iter().map(|r| &r.id))?;

        for round in &self.rounds {
            ensure_unique(
                &format!("segment in round {}", round.id),
                round.segments.iter().map(|s| &s.id),
            )?;

            let facility = self
                .facilities
                .iter()
                .find(|f| f.id.as_str() == round.facility_id)
                .ok_or_else(|| {
                    CoreError::InvalidFixture(format!(
                        "round {} references unknown facility {}",
                        round.id, round.facility_id
                    ))
                })?;

            for segment in &round.segments {
                if let Some(suggested) = segment.suggested_patient_id.as_deref() {
                    if facility.find_roster_patient(suggested).is_none() {
                        tracing::warn!(
                            round_id = %round.id,
                            segment_id = %segment.id,
                            "suggested patient {} is not on the roster of {}",
                            suggested,
                            facility.id
                        );
                    }
                }
            }
        }

        Ok(())
    }
}

fn ensure_unique<'a>(
    kind: &str,
    ids: impl Iterator<Item = &'a NonEmptyText>,
) -> CoreResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id.as_str()) {
            return Err(CoreError::InvalidFixture(format!("duplicate {kind} id {id}")));
        }
    }
    Ok(())
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DatasetWire {
    #[serde(default)]
    patients: Vec<Patient>,
    #[serde(default)]
    facilities: Vec<Facility>,
    #[serde(default)]
    rounds: Vec<RoundWire>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RoundWire {
    id: NonEmptyText,
    date: String,
    #[serde(default)]
    timeframe: String,
    facility_id: String,
    #[serde(default)]
    segments: Vec<SegmentWire>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SegmentWire {
    id: NonEmptyText,
    order: u32,
    #[serde(default)]
    predicted_name: String,
    #[serde(default)]
    from_patient: Option<String>,
    #[serde(default)]
    transcript: Option<String>,
    #[serde(default)]
    clinical_data: Option<ClinicalData>,
    #[serde(default)]
    suggested_patient_id: Option<String>,
}

impl RoundWire {
    fn resolve(self, patients: &[Patient]) -> CoreResult<Round> {
        let segments = self
            .segments
            .into_iter()
            .map(|segment| segment.resolve(patients))
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Round {
            id: self.id,
            date: self.date,
            timeframe: self.timeframe,
            facility_id: self.facility_id,
            segments,
        })
    }
}

impl SegmentWire {
    fn resolve(self, patients: &[Patient]) -> CoreResult<RoundSegment> {
        let (source_transcript, source_data) = match self.from_patient.as_deref() {
            Some(patient_id) => {
                let record = find_patient(patients, patient_id)
                    .and_then(Patient::latest_record)
                    .ok_or_else(|| CoreError::SourceRecordMissing(patient_id.to_string()))?;
                (record.transcript.clone(), record.clinical_data.clone())
            }
            None => (String::new(), ClinicalData::default()),
        };

        Ok(RoundSegment {
            id: self.id,
            order: self.order,
            predicted_name: self.predicted_name,
            transcript: self.transcript.unwrap_or(source_transcript),
            clinical_data: self.clinical_data.unwrap_or(source_data),
            suggested_patient_id: self.suggested_patient_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
patients:
  - id: p1
    name: 田中 健
    kana: タナカ ケン
    birth_date: "1948-04-02"
    age: 77
    gender: male
    records:
      - id: r1
        date: "2025-11-12"
        transcript: 足が痛い
        status: pending
        clinical_data:
          soap:
            subjective: 足の痛み
facilities:
  - id: f1
    name: さくら苑
    kind: facility
    roster:
      - id: roster-p1
        name: 田中 健
rounds:
  - id: round-1
    date: "2025-11-12"
    timeframe: 午前
    facility_id: f1
    segments:
      - id: seg-1
        order: 1
        predicted_name: タナカさん？
        from_patient: p1
        suggested_patient_id: roster-p1
"#;

    #[test]
    fn demo_dataset_loads() {
        let demo = Dataset::demo().expect("embedded dataset is valid");
        assert!(!demo.patients.is_empty());
        assert!(!demo.facilities.is_empty());
        assert!(!demo.rounds.is_empty());
    }

    #[test]
    fn segments_copy_source_record() {
        let dataset = Dataset::from_yaml_str(MINIMAL).expect("valid yaml");
        let segment = &dataset.rounds[0].segments[0];
        assert_eq!(segment.transcript, "足が痛い");
        assert_eq!(segment.clinical_data.soap.subjective, "足の痛み");
        assert_eq!(segment.suggested_patient_id.as_deref(), Some("roster-p1"));
    }

    #[test]
    fn missing_source_record_is_an_error() {
        let yaml = MINIMAL.replace("from_patient: p1", "from_patient: p9");
        let err = Dataset::from_yaml_str(&yaml).expect_err("unknown source patient");
        assert!(matches!(err, CoreError::SourceRecordMissing(id) if id == "p9"));
    }

    #[test]
    fn schema_errors_name_the_path() {
        let yaml = MINIMAL.replace("order: 1", "order: first");
        let err = Dataset::from_yaml_str(&yaml).expect_err("bad order");
        match err {
            CoreError::FixtureSchema { path, .. } => assert!(path.contains("order"), "{path}"),
            other => panic!("expected FixtureSchema error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let yaml = format!("{MINIMAL}unexpected_key: true\n");
        let err = Dataset::from_yaml_str(&yaml).expect_err("unknown key");
        match err {
            CoreError::FixtureSchema { message, .. } => assert!(message.contains("unexpected_key")),
            other => panic!("expected FixtureSchema error, got {other:?}"),
        }
    }

    #[test]
    fn round_must_reference_known_facility() {
        let yaml = MINIMAL.replace("facility_id: f1", "facility_id: f2");
        let err = Dataset::from_yaml_str(&yaml).expect_err("unknown facility");
        assert!(matches!(err, CoreError::InvalidFixture(msg) if msg.contains("f2")));
    }

    #[test]
    fn duplicate_segment_ids_are_rejected() {
        let yaml = format!(
            "{MINIMAL}      - id: seg-1\n        order: 2\n        predicted_name: 重複\n"
        );
        let err = Dataset::from_yaml_str(&yaml).expect_err("duplicate segment");
        assert!(matches!(err, CoreError::InvalidFixture(msg) if msg.contains("seg-1")));
    }

    #[test]
    fn loads_from_file_and_config() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(MINIMAL.as_bytes()).expect("write fixture");

        let cfg = CoreConfig::new(Some(file.path().to_path_buf()), 3000).expect("config");
        let dataset = Dataset::from_config(&cfg).expect("load from file");
        assert_eq!(dataset.patients.len(), 1);

        let missing = Dataset::load(Path::new("/definitely/not/here.yaml"));
        assert!(matches!(missing, Err(CoreError::FixtureRead(_))));
    }
}
