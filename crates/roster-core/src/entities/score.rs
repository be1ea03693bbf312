use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Grade;
use crate::grading::{Evaluation, SubjectScores};

/// Per-student row of six raw scores plus the derived summary.
///
/// `total`, `percentage`, and `grade` are always computed from `scores` at
/// write time.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ScoreRecord {
    pub id: String,
    pub student_id: String,
    #[serde(flatten)]
    pub scores: SubjectScores,
    pub total: i64,
    pub percentage: i64,
    pub grade: Grade,
}

impl ScoreRecord {
    /// The derived fields as an `Evaluation`.
    #[must_use]
    pub const fn evaluation(&self) -> Evaluation {
        Evaluation {
            total: self.total,
            percentage: self.percentage,
            grade: self.grade,
        }
    }
}
