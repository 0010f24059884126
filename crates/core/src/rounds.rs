//! Round assignment browser.
//!
//! Holds the static facility/round catalogue together with the [`AssignmentBoard`] and
//! derives everything a caller shows: round progress, ordered segments and the name of the
//! linked roster patient.

use crate::assignment::{AssignmentAction, AssignmentBoard, AssignmentKey, AssignmentStatus};
use crate::constants::UNCONFIRMED_LABEL;
use crate::model::{find_facility, find_round, Facility, Round, RoundSegment};
use serde::{Deserialize, Serialize};

/// Derived per-round counts; never stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundProgress {
    pub total: usize,
    pub confirmed: usize,
}

impl RoundProgress {
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.confirmed == self.total
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round_id: String,
    pub date: String,
    pub timeframe: String,
    pub facility_id: String,
    pub facility_name: String,
    pub progress: RoundProgress,
}

/// A segment joined with its current assignment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentView {
    pub segment_id: String,
    pub order: u32,
    pub predicted_name: String,
    pub suggested_patient_id: Option<String>,
    pub roster_patient_id: Option<String>,
    pub status: AssignmentStatus,
    /// Linked roster patient's name, or the unconfirmed placeholder.
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundBrowserAction {
    SelectRound(String),
    ClearRound,
    Assignment(AssignmentAction),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundBrowser {
    facilities: Vec<Facility>,
    rounds: Vec<Round>,
    board: AssignmentBoard,
    selected_round_id: Option<String>,
}

impl RoundBrowser {
    /// Builds the browser with rounds ordered newest first (ties by id) and a freshly seeded
    /// assignment board.
    pub fn new(facilities: Vec<Facility>, mut rounds: Vec<Round>) -> Self {
        rounds.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        let board = AssignmentBoard::seeded(&rounds);
        Self {
            facilities,
            rounds,
            board,
            selected_round_id: None,
        }
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn board(&self) -> &AssignmentBoard {
        &self.board
    }

    pub fn selected_round(&self) -> Option<&Round> {
        self.selected_round_id
            .as_deref()
            .and_then(|id| find_round(&self.rounds, id))
    }

    pub fn round(&self, round_id: &str) -> Option<&Round> {
        find_round(&self.rounds, round_id)
    }

    pub fn facility_for(&self, round: &Round) -> Option<&Facility> {
        find_facility(&self.facilities, &round.facility_id)
    }

    pub fn update(self, action: RoundBrowserAction) -> Self {
        match action {
            RoundBrowserAction::SelectRound(round_id) => Self {
                selected_round_id: Some(round_id),
                ..self
            },
            RoundBrowserAction::ClearRound => Self {
                selected_round_id: None,
                ..self
            },
            RoundBrowserAction::Assignment(action) => {
                if !self.accepts(&action) {
                    return self;
                }
                Self {
                    board: self.board.apply(&action),
                    ..self
                }
            }
        }
    }

    /// True when `roster_patient_id` is on the roster of the round's facility.
    pub fn is_on_roster(&self, round_id: &str, roster_patient_id: &str) -> bool {
        self.round(round_id)
            .and_then(|round| self.facility_for(round))
            .is_some_and(|f| f.find_roster_patient(roster_patient_id).is_some())
    }

    fn linked_patient_resolves(&self, key: &AssignmentKey) -> bool {
        self.board
            .get(&key.round_id, &key.segment_id)
            .and_then(|a| a.roster_patient_id.as_deref())
            .is_some_and(|id| self.is_on_roster(&key.round_id, id))
    }

    /// Links must point at the round's roster, and only resolvable links can be confirmed.
    fn accepts(&self, action: &AssignmentAction) -> bool {
        let (key, accepted) = match action {
            AssignmentAction::Update {
                key,
                roster_patient_id,
            } => {
                let id = roster_patient_id.as_deref().map(str::trim).unwrap_or_default();
                (key, id.is_empty() || self.is_on_roster(&key.round_id, id))
            }
            AssignmentAction::Confirm { key } => (key, self.linked_patient_resolves(key)),
            AssignmentAction::Revert { .. } => return true,
        };
        if !accepted {
            tracing::warn!(
                round_id = %key.round_id,
                segment_id = %key.segment_id,
                "assignment ignored: roster patient does not resolve"
            );
        }
        accepted
    }

    pub fn progress(&self, round: &Round) -> RoundProgress {
        RoundProgress {
            total: round.segments.len(),
            confirmed: self.board.confirmed_count(round),
        }
    }

    pub fn summaries(&self) -> Vec<RoundSummary> {
        self.rounds.iter().map(|round| self.summary(round)).collect()
    }

    pub fn summary(&self, round: &Round) -> RoundSummary {
        RoundSummary {
            round_id: round.id.to_string(),
            date: round.date.clone(),
            timeframe: round.timeframe.clone(),
            facility_id: round.facility_id.clone(),
            facility_name: self
                .facility_for(round)
                .map(|f| f.name.clone())
                .unwrap_or_default(),
            progress: self.progress(round),
        }
    }

    /// Name of the roster patient linked to a segment.
    ///
    /// Any miss along the way (unknown round, no assignment, no linked id, unknown facility
    /// or roster entry) yields the unconfirmed placeholder.
    pub fn assigned_label(&self, round_id: &str, segment_id: &str) -> String {
        self.round(round_id)
            .and_then(|round| {
                let patient_id = self
                    .board
                    .get(round_id, segment_id)?
                    .roster_patient_id
                    .as_deref()?;
                self.facility_for(round)?.find_roster_patient(patient_id)
            })
            .map(|p| p.name.clone())
            .unwrap_or_else(|| UNCONFIRMED_LABEL.to_string())
    }

    fn segment_view(&self, round: &Round, segment: &RoundSegment) -> SegmentView {
        let assignment = self
            .board
            .get(round.id.as_str(), segment.id.as_str())
            .cloned()
            .unwrap_or_default();
        SegmentView {
            segment_id: segment.id.to_string(),
            order: segment.order,
            predicted_name: segment.predicted_name.clone(),
            suggested_patient_id: segment.suggested_patient_id.clone(),
            roster_patient_id: assignment.roster_patient_id,
            status: assignment.status,
            label: self.assigned_label(round.id.as_str(), segment.id.as_str()),
        }
    }

    /// Segments of a round in display order, or `None` for an unknown round.
    pub fn segment_views(&self, round_id: &str) -> Option<Vec<SegmentView>> {
        let round = self.round(round_id)?;
        Some(
            round
                .ordered_segments()
                .into_iter()
                .map(|segment| self.segment_view(round, segment))
                .collect(),
        )
    }
}
