//! Grades, roles, subjects, and validated field names.
//!
//! All enums store as the string returned by `as_str()`; serde uses the
//! same representation so rows and JSON payloads agree.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Grade
// ---------------------------------------------------------------------------

/// Letter grade derived from a whole-number percentage.
///
/// ```text
/// >= 90 A+   >= 80 A   >= 70 B   >= 60 C   >= 50 D   else F
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum Grade {
    #[serde(rename = "F")]
    F,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl Grade {
    /// Tier floors, highest first. The first floor the percentage reaches wins.
    const TIERS: [(i64, Self); 5] = [
        (90, Self::APlus),
        (80, Self::A),
        (70, Self::B),
        (60, Self::C),
        (50, Self::D),
    ];

    /// Map a percentage onto its tier. Lower bounds are inclusive.
    #[must_use]
    pub fn from_percentage(percentage: i64) -> Self {
        Self::TIERS
            .iter()
            .find(|(floor, _)| percentage >= *floor)
            .map_or(Self::F, |(_, grade)| *grade)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }

    /// Parse the stored label back into a grade.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "A+" => Some(Self::APlus),
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            "F" => Some(Self::F),
            _ => None,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Role of an account. Mentors are accounts with the `teacher` role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Teacher,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Subject
// ---------------------------------------------------------------------------

/// The six graded subjects, in storage column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Osd,
    Dsa,
    Python,
    Pd,
    Ose,
    Dba,
}

impl Subject {
    pub const ALL: [Self; 6] = [
        Self::Osd,
        Self::Dsa,
        Self::Python,
        Self::Pd,
        Self::Ose,
        Self::Dba,
    ];

    /// Column name in `score_records`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Osd => "osd",
            Self::Dsa => "dsa",
            Self::Python => "python",
            Self::Pd => "pd",
            Self::Ose => "ose",
            Self::Dba => "dba",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// Input field named by a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    RollNo,
    Email,
    Phone,
    Address,
    Dob,
    Semester,
    Branch,
    Mentor,
    Username,
    Password,
    Subject(Subject),
}

impl Field {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::RollNo => "roll_no",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::Dob => "dob",
            Self::Semester => "semester",
            Self::Branch => "branch",
            Self::Mentor => "mentor",
            Self::Username => "username",
            Self::Password => "password",
            Self::Subject(subject) => subject.as_str(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
