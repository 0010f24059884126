//! Round segment to roster patient assignment.
//!
//! Each `(round_id, segment_id)` pair carries the roster patient currently linked to the
//! segment and whether that link has been confirmed. The board is an immutable value: every
//! transition goes through [`AssignmentBoard::apply`] and yields a new board, which is where
//! the status invariants are enforced:
//!
//! - updating the linked patient always leaves the entry `unconfirmed`, even when the same
//!   patient is selected again; a blank patient id unlinks the segment
//! - confirming requires a linked patient; without one the board is returned unchanged
//! - reverting returns to `unconfirmed` and keeps the linked patient

use crate::model::Round;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssignmentKey {
    pub round_id: String,
    pub segment_id: String,
}

impl AssignmentKey {
    pub fn new(round_id: impl Into<String>, segment_id: impl Into<String>) -> Self {
        Self {
            round_id: round_id.into(),
            segment_id: segment_id.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    #[default]
    Unconfirmed,
    Confirmed,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub roster_patient_id: Option<String>,
    pub status: AssignmentStatus,
}

impl Assignment {
    pub fn is_confirmed(&self) -> bool {
        self.status == AssignmentStatus::Confirmed
    }
}

/// A transition request for one segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssignmentAction {
    Update {
        key: AssignmentKey,
        roster_patient_id: Option<String>,
    },
    Confirm {
        key: AssignmentKey,
    },
    Revert {
        key: AssignmentKey,
    },
}

/// Trimmed patient id, or `None` when blank.
fn linked_id(roster_patient_id: Option<&str>) -> Option<String> {
    roster_patient_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssignmentBoard {
    entries: BTreeMap<AssignmentKey, Assignment>,
}

impl AssignmentBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// One unconfirmed entry per segment, pre-linked to the segment's suggested patient.
    pub fn seeded(rounds: &[Round]) -> Self {
        let entries = rounds
            .iter()
            .flat_map(|round| {
                round.segments.iter().map(move |segment| {
                    (
                        AssignmentKey::new(round.id.as_str(), segment.id.as_str()),
                        Assignment {
                            roster_patient_id: linked_id(segment.suggested_patient_id.as_deref()),
                            status: AssignmentStatus::Unconfirmed,
                        },
                    )
                })
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, round_id: &str, segment_id: &str) -> Option<&Assignment> {
        self.entries.get(&AssignmentKey::new(round_id, segment_id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applies one transition and returns the resulting board.
    pub fn apply(&self, action: &AssignmentAction) -> Self {
        let mut entries = self.entries.clone();

        match action {
            AssignmentAction::Update {
                key,
                roster_patient_id,
            } => {
                let roster_patient_id = linked_id(roster_patient_id.as_deref());
                tracing::debug!(
                    round_id = %key.round_id,
                    segment_id = %key.segment_id,
                    roster_patient_id = ?roster_patient_id,
                    "assignment updated"
                );
                entries.insert(
                    key.clone(),
                    Assignment {
                        roster_patient_id,
                        status: AssignmentStatus::Unconfirmed,
                    },
                );
            }
            AssignmentAction::Confirm { key } => match entries.get_mut(key) {
                Some(entry) if entry.roster_patient_id.is_some() => {
                    entry.status = AssignmentStatus::Confirmed;
                }
                Some(_) => {
                    tracing::warn!(
                        round_id = %key.round_id,
                        segment_id = %key.segment_id,
                        "confirm ignored: no roster patient linked"
                    );
                }
                None => {
                    tracing::warn!(
                        round_id = %key.round_id,
                        segment_id = %key.segment_id,
                        "confirm ignored: unknown segment"
                    );
                }
            },
            AssignmentAction::Revert { key } => match entries.get_mut(key) {
                Some(entry) => entry.status = AssignmentStatus::Unconfirmed,
                None => {
                    tracing::warn!(
                        round_id = %key.round_id,
                        segment_id = %key.segment_id,
                        "revert ignored: unknown segment"
                    );
                }
            },
        }

        Self { entries }
    }

    pub fn update_assignment(
        &self,
        round_id: &str,
        segment_id: &str,
        roster_patient_id: Option<&str>,
    ) -> Self {
        self.apply(&AssignmentAction::Update {
            key: AssignmentKey::new(round_id, segment_id),
            roster_patient_id: roster_patient_id.map(str::to_string),
        })
    }

    pub fn confirm_assignment(&self, round_id: &str, segment_id: &str) -> Self {
        self.apply(&AssignmentAction::Confirm {
            key: AssignmentKey::new(round_id, segment_id),
        })
    }

    pub fn revert_assignment(&self, round_id: &str, segment_id: &str) -> Self {
        self.apply(&AssignmentAction::Revert {
            key: AssignmentKey::new(round_id, segment_id),
        })
    }

    /// Number of confirmed segments of `round`.
    pub fn confirmed_count(&self, round: &Round) -> usize {
        round
            .segments
            .iter()
            .filter(|s| {
                self.get(round.id.as_str(), s.id.as_str())
                    .is_some_and(Assignment::is_confirmed)
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::{round, segment};

    fn entry(board: &AssignmentBoard, round_id: &str, segment_id: &str) -> Assignment {
        board
            .get(round_id, segment_id)
            .cloned()
            .expect("assignment exists")
    }

    #[test]
    fn update_confirm_revert_cycle() {
        let board = AssignmentBoard::new()
            .update_assignment("r1", "s1", Some("roster-p1"))
            .confirm_assignment("r1", "s1");
        assert_eq!(
            entry(&board, "r1", "s1"),
            Assignment {
                roster_patient_id: Some("roster-p1".into()),
                status: AssignmentStatus::Confirmed,
            }
        );

        let board = board.revert_assignment("r1", "s1");
        assert_eq!(
            entry(&board, "r1", "s1"),
            Assignment {
                roster_patient_id: Some("roster-p1".into()),
                status: AssignmentStatus::Unconfirmed,
            }
        );
    }

    #[test]
    fn reselecting_same_patient_reopens_confirmation() {
        let board = AssignmentBoard::new()
            .update_assignment("r1", "s1", Some("roster-p1"))
            .confirm_assignment("r1", "s1")
            .update_assignment("r1", "s1", Some("roster-p1"));
        assert_eq!(entry(&board, "r1", "s1").status, AssignmentStatus::Unconfirmed);
    }

    #[test]
    fn clearing_patient_resets_status() {
        let board = AssignmentBoard::new()
            .update_assignment("r1", "s1", Some("roster-p1"))
            .confirm_assignment("r1", "s1")
            .update_assignment("r1", "s1", None);
        assert_eq!(entry(&board, "r1", "s1"), Assignment::default());
    }

    #[test]
    fn confirm_without_patient_is_ignored() {
        let board = AssignmentBoard::new().update_assignment("r1", "s1", None);
        let after = board.confirm_assignment("r1", "s1");
        assert_eq!(after, board);
        assert_eq!(entry(&after, "r1", "s1").status, AssignmentStatus::Unconfirmed);
    }

    #[test]
    fn blank_patient_id_unlinks_and_cannot_be_confirmed() {
        for blank in ["", "   "] {
            let board = AssignmentBoard::new()
                .update_assignment("r1", "s1", Some("roster-p1"))
                .update_assignment("r1", "s1", Some(blank));
            assert_eq!(entry(&board, "r1", "s1"), Assignment::default());

            let after = board.confirm_assignment("r1", "s1");
            assert_eq!(entry(&after, "r1", "s1").status, AssignmentStatus::Unconfirmed);
        }
    }

    #[test]
    fn unknown_keys_are_no_ops_for_confirm_and_revert() {
        let board = AssignmentBoard::new();
        assert_eq!(board.confirm_assignment("r9", "s9"), board);
        assert_eq!(board.revert_assignment("r9", "s9"), board);
        assert!(board.get("r9", "s9").is_none());
    }

    #[test]
    fn transitions_do_not_touch_the_previous_board() {
        let before = AssignmentBoard::new().update_assignment("r1", "s1", Some("roster-p1"));
        let _after = before.confirm_assignment("r1", "s1");
        assert_eq!(entry(&before, "r1", "s1").status, AssignmentStatus::Unconfirmed);
    }

    #[test]
    fn seeds_from_suggestions_and_counts_confirmed() {
        let rounds = vec![round(
            "r1",
            "2025-11-12",
            "f1",
            vec![
                segment("s1", 1, Some("roster-p1")),
                segment("s2", 2, None),
                segment("s3", 3, Some("roster-p3")),
            ],
        )];
        let board = AssignmentBoard::seeded(&rounds);
        assert_eq!(board.len(), 3);
        assert_eq!(
            entry(&board, "r1", "s1").roster_patient_id.as_deref(),
            Some("roster-p1")
        );
        assert_eq!(entry(&board, "r1", "s2").roster_patient_id, None);
        assert_eq!(board.confirmed_count(&rounds[0]), 0);

        let board = board
            .confirm_assignment("r1", "s1")
            .confirm_assignment("r1", "s2")
            .confirm_assignment("r1", "s3");
        assert_eq!(board.confirmed_count(&rounds[0]), 2);
    }
}
