//! Record approval.
//!
//! Status is the only record field that changes after creation. Each operation here returns
//! a new patient list; the input is never modified.

use crate::model::{Patient, RecordStatus};

/// Returns a copy of `patients` with one record's status replaced.
///
/// Only the record identified by `(patient_id, record_id)` changes. When either id does not
/// resolve the returned list equals the input.
pub fn set_record_status(
    patients: &[Patient],
    patient_id: &str,
    record_id: &str,
    status: RecordStatus,
) -> Vec<Patient> {
    patients
        .iter()
        .map(|p| {
            if p.id.as_str() != patient_id {
                return p.clone();
            }
            let mut updated = p.clone();
            updated.records = p
                .records
                .iter()
                .map(|r| {
                    let mut r = r.clone();
                    if r.id.as_str() == record_id {
                        r.status = status;
                    }
                    r
                })
                .collect();
            updated
        })
        .collect()
}

pub fn approve_record(patients: &[Patient], patient_id: &str, record_id: &str) -> Vec<Patient> {
    set_record_status(patients, patient_id, record_id, RecordStatus::Approved)
}

pub fn unapprove_record(patients: &[Patient], patient_id: &str, record_id: &str) -> Vec<Patient> {
    set_record_status(patients, patient_id, record_id, RecordStatus::Pending)
}

/// True when `(patient_id, record_id)` names an existing record.
pub fn record_exists(patients: &[Patient], patient_id: &str, record_id: &str) -> bool {
    crate::model::find_patient(patients, patient_id)
        .and_then(|p| p.find_record(record_id))
        .is_some()
}
