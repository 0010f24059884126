//! Request and response bodies for the REST API.
//!
//! Core model values are embedded as-is; for OpenAPI they are described as generic objects.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use yorisoi_core::draft::{ClinicalDraft, ListField, MedicationField, SoapField};
use yorisoi_core::{
    Assignment, ClinicalData, Notification, Patient, RecordStatus, RosterPatient, RoundSummary,
    SegmentView,
};
use yorisoi_types::{display_date, short_display_date};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPatientsQuery {
    /// Free-text filter on name, kana or id
    pub q: Option<String>,
    /// `date` (default), `id` or `name`
    pub sort: Option<String>,
}

/// One row of the patient list.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientSummary {
    pub id: String,
    pub name: String,
    pub kana: String,
    pub age: u32,
    pub gender: String,
    pub birth_date: String,
    pub latest_record_date: Option<String>,
    pub record_count: usize,
    pub has_pending: bool,
}

impl From<&Patient> for PatientSummary {
    fn from(p: &Patient) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            kana: p.kana.clone(),
            age: p.age,
            gender: p.gender.label().to_string(),
            birth_date: display_date(&p.birth_date),
            latest_record_date: p.latest_record().map(|r| short_display_date(&r.date)),
            record_count: p.records.len(),
            has_pending: p.has_pending(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListPatientsRes {
    pub patients: Vec<PatientSummary>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientDetailRes {
    #[schema(value_type = Object)]
    pub patient: Patient,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordStatusRes {
    pub patient_id: String,
    pub record_id: String,
    /// `None` when the ids do not resolve
    #[schema(value_type = Option<String>)]
    pub status: Option<RecordStatus>,
    #[schema(value_type = Option<Object>)]
    pub notification: Option<Notification>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecordTextQuery {
    /// `emr` (default), `soap` or `home_visit`
    pub format: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordTextRes {
    pub format: String,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MedicationEditReq {
    /// Zero-based row; rows past the end are ignored
    pub row: usize,
    /// `name`, `dose`, `route`, `frequency`, `status` or `reason_or_note`
    #[schema(value_type = String)]
    pub field: MedicationField,
    pub value: String,
}

/// Local edits to a record's clinical data. Omitted fields keep the record's values.
///
/// List fields take one item per line; `main_problems` is comma separated.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DraftReq {
    pub subjective: Option<String>,
    pub objective: Option<String>,
    pub assessment: Option<String>,
    pub plan: Option<String>,
    pub main_problems: Option<String>,
    pub note_for_pharmacy: Option<String>,
    pub adherence: Option<String>,
    pub follow_up: Option<String>,
    pub red_flags: Option<String>,
    pub need_to_contact_physician: Option<String>,
    pub side_effects: Option<String>,
    pub drug_related_problems: Option<String>,
    pub labs_and_monitoring: Option<String>,
    pub patient_education: Option<String>,
    /// Empty medication rows appended before `medication_edits` are applied
    pub add_medication_rows: usize,
    pub medication_edits: Vec<MedicationEditReq>,
    /// `emr` (default), `soap` or `home_visit`
    pub format: Option<String>,
}

impl DraftReq {
    pub fn apply_to(&self, draft: &mut ClinicalDraft) {
        let soap = [
            (SoapField::Subjective, &self.subjective),
            (SoapField::Objective, &self.objective),
            (SoapField::Assessment, &self.assessment),
            (SoapField::Plan, &self.plan),
        ];
        for (field, text) in soap {
            if let Some(text) = text {
                draft.set_soap(field, text.as_str());
            }
        }

        let lists = [
            (ListField::RedFlags, &self.red_flags),
            (ListField::NeedToContactPhysician, &self.need_to_contact_physician),
            (ListField::SideEffects, &self.side_effects),
            (ListField::DrugRelatedProblems, &self.drug_related_problems),
            (ListField::LabsAndMonitoring, &self.labs_and_monitoring),
            (ListField::PatientEducation, &self.patient_education),
        ];
        for (field, text) in lists {
            if let Some(text) = text {
                draft.set_list_lines(field, text);
            }
        }

        if let Some(text) = &self.main_problems {
            draft.set_main_problems_csv(text);
        }
        if let Some(text) = &self.note_for_pharmacy {
            draft.set_note_for_pharmacy(text.as_str());
        }
        if let Some(text) = &self.adherence {
            draft.set_adherence(text.as_str());
        }
        if let Some(text) = &self.follow_up {
            draft.set_follow_up(text.as_str());
        }

        let table = draft.medications_mut();
        for _ in 0..self.add_medication_rows {
            table.add_row();
        }
        for edit in &self.medication_edits {
            if !table.edit(edit.row, edit.field, edit.value.as_str()) {
                tracing::warn!("Draft medication edit ignored for missing row {}", edit.row);
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DraftRes {
    pub record_id: String,
    pub format: String,
    /// Draft rendered in `format`
    pub text: String,
    #[schema(value_type = Object)]
    pub clinical_data: ClinicalData,
    #[schema(value_type = Option<Object>)]
    pub notification: Option<Notification>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListRoundsRes {
    #[schema(value_type = Vec<Object>)]
    pub rounds: Vec<RoundSummary>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoundDetailRes {
    #[schema(value_type = Object)]
    pub summary: RoundSummary,
    #[schema(value_type = Vec<Object>)]
    pub segments: Vec<SegmentView>,
    #[schema(value_type = Vec<Object>)]
    pub roster: Vec<RosterPatient>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateAssignmentReq {
    /// `null` unlinks the segment
    pub roster_patient_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignmentRes {
    pub round_id: String,
    pub segment_id: String,
    /// `None` when the round or segment does not exist
    #[schema(value_type = Option<Object>)]
    pub assignment: Option<Assignment>,
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationRes {
    #[schema(value_type = Option<Object>)]
    pub notification: Option<Notification>,
}
