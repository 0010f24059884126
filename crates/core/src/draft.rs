//! Local editing drafts.
//!
//! A draft is a private copy of a record's clinical data. Edits change the draft only and
//! are never written back into the patient list.

use crate::constants::DEFAULT_MEDICATION_STATUS;
use crate::model::{ClinicalData, Medication, Record};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoapField {
    Subjective,
    Objective,
    Assessment,
    Plan,
}

/// Line-per-item list fields edited through a multi-line text box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListField {
    RedFlags,
    NeedToContactPhysician,
    SideEffects,
    DrugRelatedProblems,
    LabsAndMonitoring,
    PatientEducation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedicationField {
    Name,
    Dose,
    Route,
    Frequency,
    Status,
    ReasonOrNote,
}

/// Editable medication rows, seeded from a record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MedicationTable {
    rows: Vec<Medication>,
}

impl MedicationTable {
    pub fn seeded(medications: &[Medication]) -> Self {
        Self {
            rows: medications.to_vec(),
        }
    }

    pub fn rows(&self) -> &[Medication] {
        &self.rows
    }

    /// Appends an empty row with the default status.
    pub fn add_row(&mut self) {
        self.rows.push(Medication {
            status: DEFAULT_MEDICATION_STATUS.to_string(),
            ..Medication::default()
        });
    }

    /// Replaces one field of row `index`. Returns `false` when the row does not exist.
    pub fn edit(&mut self, index: usize, field: MedicationField, value: impl Into<String>) -> bool {
        let Some(row) = self.rows.get_mut(index) else {
            return false;
        };
        let value = value.into();
        match field {
            MedicationField::Name => row.name = value,
            MedicationField::Dose => row.dose = value,
            MedicationField::Route => row.route = value,
            MedicationField::Frequency => row.frequency = value,
            MedicationField::Status => row.status = value,
            MedicationField::ReasonOrNote => row.reason_or_note = value,
        }
        true
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_csv(text: &str) -> Vec<String> {
    text.split([',', '、'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// A working copy of one record's clinical data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClinicalDraft {
    record_id: String,
    data: ClinicalData,
    medications: MedicationTable,
}

impl ClinicalDraft {
    pub fn from_record(record: &Record) -> Self {
        Self {
            record_id: record.id.to_string(),
            medications: MedicationTable::seeded(&record.clinical_data.pharmacy_focus.medications),
            data: record.clinical_data.clone(),
        }
    }

    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    pub fn medications(&self) -> &MedicationTable {
        &self.medications
    }

    pub fn medications_mut(&mut self) -> &mut MedicationTable {
        &mut self.medications
    }

    pub fn set_soap(&mut self, field: SoapField, text: impl Into<String>) {
        let soap = &mut self.data.soap;
        let text = text.into();
        match field {
            SoapField::Subjective => soap.subjective = text,
            SoapField::Objective => soap.objective = text,
            SoapField::Assessment => soap.assessment = text,
            SoapField::Plan => soap.plan = text,
        }
    }

    /// Main problems are edited as one comma separated line.
    pub fn set_main_problems_csv(&mut self, text: &str) {
        self.data.meta.main_problems = split_csv(text);
    }

    pub fn set_note_for_pharmacy(&mut self, text: impl Into<String>) {
        self.data.meta.note_for_pharmacy = text.into();
    }

    pub fn set_adherence(&mut self, text: impl Into<String>) {
        self.data.pharmacy_focus.adherence = text.into();
    }

    pub fn set_follow_up(&mut self, text: impl Into<String>) {
        self.data.pharmacy_focus.follow_up = text.into();
    }

    /// Replaces a list field from newline separated text; blank lines are dropped.
    pub fn set_list_lines(&mut self, field: ListField, text: &str) {
        let items = split_lines(text);
        let pf = &mut self.data.pharmacy_focus;
        let alerts = &mut self.data.alerts;
        match field {
            ListField::RedFlags => alerts.red_flags = items,
            ListField::NeedToContactPhysician => alerts.need_to_contact_physician = items,
            ListField::SideEffects => pf.side_effects = items,
            ListField::DrugRelatedProblems => pf.drug_related_problems = items,
            ListField::LabsAndMonitoring => pf.labs_and_monitoring = items,
            ListField::PatientEducation => pf.patient_education = items,
        }
    }

    /// The draft contents as clinical data, with the edited medication rows folded in.
    pub fn to_clinical_data(&self) -> ClinicalData {
        let mut data = self.data.clone();
        data.pharmacy_focus.medications = self.medications.rows().to_vec();
        data
    }
}
