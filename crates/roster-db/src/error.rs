//! Error taxonomy for record store operations.
//!
//! Every coordinator operation returns exactly one `RecordError`. The open
//! transaction has already been rolled back by the time a caller sees one.

use roster_core::enums::Field;
use roster_core::errors::ValidationError;
use thiserror::Error;

/// Failures below the domain layer. Treated as transient.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// A stored row could not be decoded (bad date, unknown grade label).
    #[error("Invalid row: {0}")]
    InvalidRow(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Password hashing failed.
    #[error("Credential hashing failed: {0}")]
    Hashing(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),
}

/// Caller-visible result of a failed operation.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Input breaks a uniqueness, reference, or range constraint.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No row matches the key.
    #[error("Not found: {key}")]
    NotFound { key: String },

    /// The transaction could not run or commit.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A student exists without its score record (or the reverse). Never
    /// repaired automatically.
    #[error("Integrity fault for student {student_id}: {detail}")]
    IntegrityFault { student_id: String, detail: String },
}

impl RecordError {
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn missing_score_record(student_id: impl Into<String>) -> Self {
        Self::IntegrityFault {
            student_id: student_id.into(),
            detail: "student has no score record".into(),
        }
    }

    /// Map a failed write to `students`. The only foreign key there is the
    /// mentor, so a reference failure means the mentor account is unknown.
    pub(crate) fn from_student_write(e: libsql::Error) -> Self {
        if is_foreign_key_failure(&e) {
            return Self::Validation(ValidationError::unknown_mentor());
        }
        e.into()
    }

    /// Map a failed write to `score_records`. A reference failure there means
    /// the owning student row is missing.
    pub(crate) fn from_score_write(e: libsql::Error, student_id: &str) -> Self {
        if is_foreign_key_failure(&e) {
            tracing::error!(student_id, "score record references a missing student");
            return Self::IntegrityFault {
                student_id: student_id.to_string(),
                detail: "score record has no owning student".into(),
            };
        }
        e.into()
    }

    /// Storage faults may succeed on a fresh attempt; everything else will
    /// fail the same way until the input or data changes.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// The validation failure, if this is one.
    #[must_use]
    pub const fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(v) => Some(v),
            _ => None,
        }
    }
}

impl From<libsql::Error> for RecordError {
    /// Constraint violations raised by the schema map back onto the field
    /// they protect; anything else is a storage fault.
    fn from(e: libsql::Error) -> Self {
        match constraint_violation(&e.to_string()) {
            Some(violation) => Self::Validation(violation),
            None => Self::Storage(StorageError::LibSql(e)),
        }
    }
}

fn is_foreign_key_failure(e: &libsql::Error) -> bool {
    e.to_string().contains("FOREIGN KEY constraint failed")
}

/// Recognise SQLite constraint messages for the columns the validator owns.
///
/// Foreign key failures do not name their table, so they are left to the
/// write site that knows which reference it touched.
fn constraint_violation(msg: &str) -> Option<ValidationError> {
    const UNIQUE: [(&str, Field); 5] = [
        ("students.roll_no", Field::RollNo),
        ("students.email", Field::Email),
        ("students.phone", Field::Phone),
        ("accounts.username", Field::Username),
        ("accounts.email", Field::Email),
    ];

    if let Some(rest) = msg.split("UNIQUE constraint failed: ").nth(1) {
        return UNIQUE
            .iter()
            .find(|(column, _)| rest.starts_with(column))
            .map(|(_, field)| ValidationError::duplicate(*field));
    }
    if msg.contains("CHECK constraint failed") && msg.contains("semester") {
        return Some(ValidationError::out_of_range(Field::Semester));
    }
    None
}
