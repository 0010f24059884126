//! Patient browser state and its update function.
//!
//! The browser moves from the patient list to a patient's record list and then to a single
//! record. Every action is applied by [`PatientBrowser::update`], which consumes the state and
//! returns the next one.

use crate::clipboard::{copy_text_to, ClipboardSink};
use crate::constants::{MSG_APPROVED, MSG_DRAFT_SAVED, MSG_UNAPPROVED};
use crate::model::{find_patient, Patient, Record};
use crate::notification::{NotificationKind, Notifier};
use crate::patient_list::{filter_and_sort, SortKey};
use crate::records::{approve_record, record_exists, unapprove_record};
use crate::text::{TextFormat, VisitContext};
use chrono::{DateTime, Utc};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatientBrowserAction {
    /// Opens a patient's record list; any open record is closed.
    SelectPatient(String),
    ClearPatient,
    SelectRecord(String),
    BackToRecordList,
    Approve,
    Unapprove,
    /// Local drafts are not persisted; this only acknowledges the save.
    SaveDraft,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientBrowser {
    patients: Vec<Patient>,
    selected_patient_id: Option<String>,
    selected_record_id: Option<String>,
    notifier: Notifier,
}

impl PatientBrowser {
    pub fn new(patients: Vec<Patient>, notifier: Notifier) -> Self {
        Self {
            patients,
            selected_patient_id: None,
            selected_record_id: None,
            notifier,
        }
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn list(&self, query: &str, key: SortKey) -> Vec<&Patient> {
        filter_and_sort(&self.patients, query, key)
    }

    pub fn selected_patient(&self) -> Option<&Patient> {
        self.selected_patient_id
            .as_deref()
            .and_then(|id| find_patient(&self.patients, id))
    }

    pub fn selected_record(&self) -> Option<&Record> {
        let record_id = self.selected_record_id.as_deref()?;
        self.selected_patient()?.find_record(record_id)
    }

    /// Patient and record ids of the open record, when both still resolve.
    fn selection(&self) -> Option<(String, String)> {
        let patient = self.selected_patient()?;
        let record = self.selected_record()?;
        Some((patient.id.to_string(), record.id.to_string()))
    }

    pub fn update(self, action: PatientBrowserAction, now: DateTime<Utc>) -> Self {
        match action {
            PatientBrowserAction::SelectPatient(patient_id) => Self {
                selected_patient_id: Some(patient_id),
                selected_record_id: None,
                ..self
            },
            PatientBrowserAction::ClearPatient => Self {
                selected_patient_id: None,
                selected_record_id: None,
                ..self
            },
            PatientBrowserAction::SelectRecord(record_id) => Self {
                selected_record_id: Some(record_id),
                ..self
            },
            PatientBrowserAction::BackToRecordList => Self {
                selected_record_id: None,
                ..self
            },
            PatientBrowserAction::Approve => match self.selection() {
                Some((patient_id, record_id)) => Self {
                    patients: approve_record(&self.patients, &patient_id, &record_id),
                    notifier: self.notifier.show(MSG_APPROVED, NotificationKind::Success, now),
                    ..self
                },
                None => self,
            },
            PatientBrowserAction::Unapprove => match self.selection() {
                Some((patient_id, record_id)) => Self {
                    patients: unapprove_record(&self.patients, &patient_id, &record_id),
                    notifier: self.notifier.show(MSG_UNAPPROVED, NotificationKind::Info, now),
                    ..self
                },
                None => self,
            },
            PatientBrowserAction::SaveDraft => Self {
                notifier: self.notifier.show(MSG_DRAFT_SAVED, NotificationKind::Info, now),
                ..self
            },
        }
    }

    /// Approves a record addressed directly by id, without touching the selection.
    ///
    /// Unknown ids leave the state, and the notification, unchanged.
    pub fn approve(self, patient_id: &str, record_id: &str, now: DateTime<Utc>) -> Self {
        if !record_exists(&self.patients, patient_id, record_id) {
            return self;
        }
        Self {
            patients: approve_record(&self.patients, patient_id, record_id),
            notifier: self.notifier.show(MSG_APPROVED, NotificationKind::Success, now),
            ..self
        }
    }

    pub fn unapprove(self, patient_id: &str, record_id: &str, now: DateTime<Utc>) -> Self {
        if !record_exists(&self.patients, patient_id, record_id) {
            return self;
        }
        Self {
            patients: unapprove_record(&self.patients, patient_id, record_id),
            notifier: self.notifier.show(MSG_UNAPPROVED, NotificationKind::Info, now),
            ..self
        }
    }

    /// Renders the open record in `format` and hands it to `sink`.
    ///
    /// Without an open record nothing is written and the state is returned as is.
    pub fn copy_selected(
        self,
        sink: &mut dyn ClipboardSink,
        format: TextFormat,
        now: DateTime<Utc>,
    ) -> Self {
        let text = match (self.selected_patient(), self.selected_record()) {
            (Some(patient), Some(record)) => Some(format.render(
                &VisitContext::new(patient.name.clone(), record.date.clone()),
                &record.clinical_data,
            )),
            _ => None,
        };
        let Some(text) = text else {
            return self;
        };
        Self {
            notifier: copy_text_to(sink, &text, self.notifier, now),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::constants::MSG_COPIED;
    use crate::model::test_support::{patient, record};
    use crate::model::RecordStatus;

    fn browser() -> PatientBrowser {
        PatientBrowser::new(
            vec![
                patient(
                    "p1",
                    "田中 健",
                    "タナカ ケン",
                    vec![
                        record("r1", "2025-11-12", RecordStatus::Pending),
                        record("r2", "2025-10-01", RecordStatus::Approved),
                    ],
                ),
                patient("p2", "佐藤 博", "サトウ ヒロシ", vec![]),
            ],
            Notifier::new(3000),
        )
    }

    fn open(browser: PatientBrowser, pid: &str, rid: &str, now: DateTime<Utc>) -> PatientBrowser {
        browser
            .update(PatientBrowserAction::SelectPatient(pid.into()), now)
            .update(PatientBrowserAction::SelectRecord(rid.into()), now)
    }

    #[test]
    fn selecting_patient_closes_open_record() {
        let now = Utc::now();
        let b = open(browser(), "p1", "r1", now);
        assert!(b.selected_record().is_some());

        let b = b.update(PatientBrowserAction::SelectPatient("p2".into()), now);
        assert_eq!(b.selected_patient().map(|p| p.id.as_str()), Some("p2"));
        assert!(b.selected_record().is_none());
    }

    #[test]
    fn approve_updates_record_and_notifies() {
        let now = Utc::now();
        let b = open(browser(), "p1", "r1", now).update(PatientBrowserAction::Approve, now);

        assert_eq!(b.selected_record().map(|r| r.status), Some(RecordStatus::Approved));
        let shown = b.notifier().visible(now).expect("notification");
        assert_eq!(shown.message, MSG_APPROVED);
    }

    #[test]
    fn unapprove_reopens_record() {
        let now = Utc::now();
        let b = open(browser(), "p1", "r2", now).update(PatientBrowserAction::Unapprove, now);
        assert_eq!(b.selected_record().map(|r| r.status), Some(RecordStatus::Pending));
        assert_eq!(
            b.notifier().visible(now).map(|n| n.kind),
            Some(NotificationKind::Info)
        );
    }

    #[test]
    fn approve_without_selection_is_a_no_op() {
        let now = Utc::now();
        let before = browser().update(PatientBrowserAction::SelectPatient("p1".into()), now);
        let after = before.clone().update(PatientBrowserAction::Approve, now);
        assert_eq!(before, after);
    }

    #[test]
    fn direct_approve_ignores_unknown_ids() {
        let now = Utc::now();
        let before = browser();
        let after = before.clone().approve("p1", "missing", now);
        assert_eq!(before, after);
        assert!(after.notifier().last().is_none());
    }

    #[test]
    fn save_draft_only_notifies() {
        let now = Utc::now();
        let before = browser();
        let after = before.clone().update(PatientBrowserAction::SaveDraft, now);
        assert_eq!(before.patients(), after.patients());
        assert_eq!(
            after.notifier().visible(now).map(|n| n.message.as_str()),
            Some(MSG_DRAFT_SAVED)
        );
    }

    #[test]
    fn copy_selected_writes_rendered_text() {
        let now = Utc::now();
        let mut sink = MemoryClipboard::new();
        let b = open(browser(), "p1", "r1", now).copy_selected(&mut sink, TextFormat::Emr, now);

        let copied = sink.contents().expect("text copied");
        assert!(copied.contains("患者: 田中 健"));
        assert!(copied.contains("診療記録: 2025-11-12"));
        assert_eq!(
            b.notifier().visible(now).map(|n| n.message.as_str()),
            Some(MSG_COPIED)
        );
    }

    #[test]
    fn list_delegates_to_filter_and_sort() {
        let b = browser();
        let ids: Vec<&str> = b.list("", SortKey::Date).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }
}
