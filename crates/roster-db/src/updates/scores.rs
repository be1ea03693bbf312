//! Score submission payload.
//!
//! Callers may echo back `total`, `percentage`, and `grade` from an earlier
//! read. They deserialize so the payload is accepted, but the coordinator
//! never stores them: derived fields are recomputed from the six scores.

use roster_core::grading::{Evaluation, SubjectScores};
use serde::{Deserialize, Serialize};

use super::student::StudentUpdate;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    #[serde(flatten)]
    pub scores: SubjectScores,

    /// Profile changes committed in the same transaction as the scores.
    #[serde(default, skip_serializing_if = "StudentUpdate::is_empty")]
    pub profile: StudentUpdate,

    /// Ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    /// Ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<i64>,
    /// Ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

impl ScoreSubmission {
    #[must_use]
    pub fn new(scores: SubjectScores) -> Self {
        Self {
            scores,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_profile(mut self, profile: StudentUpdate) -> Self {
        self.profile = profile;
        self
    }

    /// Whether the caller sent any derived field.
    #[must_use]
    pub const fn has_claimed_derived(&self) -> bool {
        self.total.is_some() || self.percentage.is_some() || self.grade.is_some()
    }

    /// Whether the caller's derived fields disagree with the computed ones.
    #[must_use]
    pub fn claims_differ_from(&self, computed: &Evaluation) -> bool {
        self.total.is_some_and(|t| t != computed.total)
            || self.percentage.is_some_and(|p| p != computed.percentage)
            || self.grade.as_deref().is_some_and(|g| g != computed.grade.as_str())
    }
}
