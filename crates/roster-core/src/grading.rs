//! Grade evaluator: six subject scores to total, percentage, and letter grade.
//!
//! Pure and total. Scores outside `0..=100` are not rejected here; they flow
//! through the arithmetic unchanged and range checks belong to the caller.
//! Sums are taken in `i128`, so no input can overflow; results beyond the
//! `i64` range saturate.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Grade, Subject};

/// Maximum obtainable total across all six subjects.
pub const MAX_TOTAL: i64 = 600;

/// Raw scores for the six subjects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct SubjectScores {
    pub osd: i64,
    pub dsa: i64,
    pub python: i64,
    pub pd: i64,
    pub ose: i64,
    pub dba: i64,
}

impl SubjectScores {
    #[must_use]
    pub const fn new(osd: i64, dsa: i64, python: i64, pd: i64, ose: i64, dba: i64) -> Self {
        Self {
            osd,
            dsa,
            python,
            pd,
            ose,
            dba,
        }
    }

    /// Same score in every subject.
    #[must_use]
    pub const fn uniform(score: i64) -> Self {
        Self::new(score, score, score, score, score, score)
    }

    #[must_use]
    pub const fn get(&self, subject: Subject) -> i64 {
        match subject {
            Subject::Osd => self.osd,
            Subject::Dsa => self.dsa,
            Subject::Python => self.python,
            Subject::Pd => self.pd,
            Subject::Ose => self.ose,
            Subject::Dba => self.dba,
        }
    }

    /// Subjects paired with their scores, in storage column order.
    pub fn iter(&self) -> impl Iterator<Item = (Subject, i64)> + '_ {
        Subject::ALL.into_iter().map(|s| (s, self.get(s)))
    }
}

/// Derived summary of a set of subject scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Evaluation {
    pub total: i64,
    pub percentage: i64,
    pub grade: Grade,
}

/// Compute total, whole percentage (round half up), and grade.
///
/// `percentage = round(total / 600 * 100)`, which reduces to `round(total / 6)`.
#[must_use]
pub fn evaluate(scores: &SubjectScores) -> Evaluation {
    let total: i128 = scores.iter().map(|(_, score)| i128::from(score)).sum();
    let percentage = saturate(round_half_up_div(total * 100, i128::from(MAX_TOTAL)));
    Evaluation {
        total: saturate(total),
        percentage,
        grade: Grade::from_percentage(percentage),
    }
}

/// `floor(numerator / denominator + 1/2)` for a positive denominator.
const fn round_half_up_div(numerator: i128, denominator: i128) -> i128 {
    (2 * numerator + denominator).div_euclid(2 * denominator)
}

fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}
