//! Subject score range policy.

use serde::{Deserialize, Serialize};

const fn default_max_subject_score() -> i64 {
    100
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoresConfig {
    /// Reject score updates with any subject outside `0..=max_subject_score`.
    /// Off by default: scores pass through unchecked.
    #[serde(default)]
    pub enforce_range: bool,

    /// Upper bound for a single subject score.
    #[serde(default = "default_max_subject_score")]
    pub max_subject_score: i64,
}

impl Default for ScoresConfig {
    fn default() -> Self {
        Self {
            enforce_range: false,
            max_subject_score: default_max_subject_score(),
        }
    }
}
