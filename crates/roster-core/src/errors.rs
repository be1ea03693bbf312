//! Validation error types.
//!
//! The constraint validator reports exactly one offending field per failure.
//! Storage-level errors live in `roster-db`, where they join this type in the
//! caller-visible `RecordError` taxonomy.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::enums::Field;

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViolationReason {
    /// Another row already holds this unique value.
    Duplicate,
    /// The value must reference an existing row and does not.
    UnknownReference,
    /// A required value is blank.
    Missing,
    /// A numeric value is outside its permitted range.
    OutOfRange,
}

impl ViolationReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Duplicate => "duplicate",
            Self::UnknownReference => "unknown_reference",
            Self::Missing => "missing",
            Self::OutOfRange => "out_of_range",
        }
    }
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input rejected before any write was committed. Always recoverable by the
/// caller correcting the named field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, JsonSchema)]
#[error("Validation failed for '{field}': {reason}")]
pub struct ValidationError {
    pub field: Field,
    pub reason: ViolationReason,
}

impl ValidationError {
    #[must_use]
    pub const fn new(field: Field, reason: ViolationReason) -> Self {
        Self { field, reason }
    }

    #[must_use]
    pub const fn duplicate(field: Field) -> Self {
        Self::new(field, ViolationReason::Duplicate)
    }

    #[must_use]
    pub const fn missing(field: Field) -> Self {
        Self::new(field, ViolationReason::Missing)
    }

    #[must_use]
    pub const fn out_of_range(field: Field) -> Self {
        Self::new(field, ViolationReason::OutOfRange)
    }

    /// The mentor username does not resolve to an account.
    #[must_use]
    pub const fn unknown_mentor() -> Self {
        Self::new(Field::Mentor, ViolationReason::UnknownReference)
    }
}
