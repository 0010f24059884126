//! # Yorisoi Core
//!
//! Core logic for the home-visit rounds documentation system.
//!
//! This crate holds the in-memory data model and every pure operation over it:
//! - Patient list filtering/sorting and record approval
//! - Round segment to roster patient assignment (confirm/revert state machine)
//! - Plain-text renderings of clinical data for EMR copy-paste
//! - Local drafts, notifications and the browser reducers that tie them together
//!
//! **No API concerns**: HTTP handlers and command-line parsing belong in `api-rest` and `cli`.

pub mod assignment;
pub mod browser;
pub mod clipboard;
pub mod config;
pub mod constants;
pub mod draft;
pub mod error;
pub mod fixtures;
pub mod model;
pub mod notification;
pub mod patient_list;
pub mod records;
pub mod rounds;
pub mod session;
pub mod text;

pub use assignment::{Assignment, AssignmentAction, AssignmentBoard, AssignmentKey, AssignmentStatus};
pub use browser::{PatientBrowser, PatientBrowserAction};
pub use clipboard::{ClipboardError, ClipboardSink};
pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use fixtures::Dataset;
pub use model::{
    Alerts, ClinicalData, Facility, FacilityKind, Gender, Medication, Meta, Patient,
    PharmacyFocus, Record, RecordStatus, RosterPatient, Round, RoundSegment, Soap,
};
pub use notification::{Notification, NotificationKind, Notifier};
pub use patient_list::{filter_and_sort, SortKey};
pub use rounds::{RoundBrowser, RoundBrowserAction, RoundProgress, RoundSummary, SegmentView};
pub use session::Session;
pub use text::{TextFormat, VisitContext};
pub use yorisoi_types::NonEmptyText;
