//! Constraint validator.
//!
//! Checks uniqueness (roll number, email, phone) and referential integrity
//! (mentor account, score record owner) before a write is committed. Every
//! check that reads the store must run on the same open transaction as the
//! write it guards; the schema's UNIQUE and FOREIGN KEY constraints stay as
//! the backstop.

use roster_config::ScoresConfig;
use roster_core::entities::{NewAccount, NewStudent, Student};
use roster_core::enums::Field;
use roster_core::errors::ValidationError;
use roster_core::grading::SubjectScores;

use crate::error::RecordError;
use crate::updates::student::StudentUpdate;

/// Columns of `students` that must be unique across all rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UniqueColumn {
    RollNo,
    Email,
    Phone,
}

impl UniqueColumn {
    const fn sql(self) -> &'static str {
        match self {
            Self::RollNo => "SELECT 1 FROM students WHERE roll_no = ?1 AND (?2 IS NULL OR id != ?2) LIMIT 1",
            Self::Email => "SELECT 1 FROM students WHERE email = ?1 AND (?2 IS NULL OR id != ?2) LIMIT 1",
            Self::Phone => "SELECT 1 FROM students WHERE phone = ?1 AND (?2 IS NULL OR id != ?2) LIMIT 1",
        }
    }

    const fn field(self) -> Field {
        match self {
            Self::RollNo => Field::RollNo,
            Self::Email => Field::Email,
            Self::Phone => Field::Phone,
        }
    }
}

fn require(value: &str, field: Field) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::missing(field));
    }
    Ok(())
}

const fn require_positive_semester(semester: i64) -> Result<(), ValidationError> {
    if semester <= 0 {
        return Err(ValidationError::out_of_range(Field::Semester));
    }
    Ok(())
}

/// Field-level checks that need no store access.
///
/// # Errors
///
/// Returns the first blank required field or a non-positive semester.
pub fn validate_required(candidate: &NewStudent) -> Result<(), ValidationError> {
    require(&candidate.name, Field::Name)?;
    require(&candidate.roll_no, Field::RollNo)?;
    require(&candidate.email, Field::Email)?;
    require(&candidate.phone, Field::Phone)?;
    require(&candidate.branch, Field::Branch)?;
    require(&candidate.mentor, Field::Mentor)?;
    require_positive_semester(candidate.semester)
}

/// Validate a student about to be inserted.
///
/// # Errors
///
/// `RecordError::Validation` naming the first offending field, or
/// `RecordError::Storage` if a lookup fails.
pub async fn validate_new_student(
    conn: &libsql::Connection,
    candidate: &NewStudent,
) -> Result<(), RecordError> {
    validate_required(candidate)?;
    ensure_unique(conn, UniqueColumn::RollNo, &candidate.roll_no, None).await?;
    ensure_unique(conn, UniqueColumn::Email, &candidate.email, None).await?;
    ensure_unique(conn, UniqueColumn::Phone, &candidate.phone, None).await?;
    validate_mentor(conn, &candidate.mentor).await
}

/// Check that `username` resolves to an existing account.
///
/// # Errors
///
/// `ValidationError { field: mentor, reason: unknown_reference }` if it does not.
pub async fn validate_mentor(conn: &libsql::Connection, username: &str) -> Result<(), RecordError> {
    let mut rows = conn
        .query("SELECT 1 FROM accounts WHERE username = ?1 LIMIT 1", [username])
        .await?;
    if rows.next().await?.is_none() {
        return Err(ValidationError::unknown_mentor().into());
    }
    Ok(())
}

/// Validate a profile change against the student's current row.
///
/// Unique fields and the mentor are re-checked only when the update actually
/// changes them; uniqueness excludes the student's own row.
///
/// # Errors
///
/// `RecordError::Validation` naming the first offending field.
pub async fn validate_profile_change(
    conn: &libsql::Connection,
    current: &Student,
    update: &StudentUpdate,
) -> Result<(), RecordError> {
    let blanks = [
        (&update.name, Field::Name),
        (&update.email, Field::Email),
        (&update.phone, Field::Phone),
        (&update.branch, Field::Branch),
        (&update.mentor, Field::Mentor),
    ];
    for (value, field) in blanks {
        if let Some(value) = value {
            require(value, field)?;
        }
    }
    if let Some(semester) = update.semester {
        require_positive_semester(semester)?;
    }

    let unique = [
        (&update.email, &current.email, UniqueColumn::Email),
        (&update.phone, &current.phone, UniqueColumn::Phone),
    ];
    for (new, old, column) in unique {
        if let Some(new) = new.as_deref().filter(|v| *v != old.as_str()) {
            ensure_unique(conn, column, new, Some(&current.id)).await?;
        }
    }

    if let Some(mentor) = update.mentor.as_deref().filter(|m| *m != current.mentor) {
        validate_mentor(conn, mentor).await?;
    }
    Ok(())
}

/// Apply the configured subject score range.
///
/// A no-op unless `policy.enforce_range` is set.
///
/// # Errors
///
/// `ValidationError { field: <subject>, reason: out_of_range }` for the first
/// subject outside `0..=policy.max_subject_score`.
pub fn validate_score_range(
    scores: &SubjectScores,
    policy: &ScoresConfig,
) -> Result<(), ValidationError> {
    if !policy.enforce_range {
        return Ok(());
    }
    let range = 0..=policy.max_subject_score;
    match scores.iter().find(|(_, score)| !range.contains(score)) {
        Some((subject, _)) => Err(ValidationError::out_of_range(Field::Subject(subject))),
        None => Ok(()),
    }
}

/// Validate a registration before hashing and insert.
///
/// # Errors
///
/// `RecordError::Validation` for a blank field or a taken username or email.
pub async fn validate_new_account(
    conn: &libsql::Connection,
    candidate: &NewAccount,
) -> Result<(), RecordError> {
    validate_account_fields(candidate)?;

    let mut rows = conn
        .query(
            "SELECT 1 FROM accounts WHERE username = ?1 LIMIT 1",
            [candidate.username.as_str()],
        )
        .await?;
    if rows.next().await?.is_some() {
        return Err(ValidationError::duplicate(Field::Username).into());
    }

    let mut rows = conn
        .query(
            "SELECT 1 FROM accounts WHERE email = ?1 LIMIT 1",
            [candidate.email.as_str()],
        )
        .await?;
    if rows.next().await?.is_some() {
        return Err(ValidationError::duplicate(Field::Email).into());
    }
    Ok(())
}

/// Blank-field checks for a registration.
///
/// # Errors
///
/// Returns the first blank field.
pub fn validate_account_fields(candidate: &NewAccount) -> Result<(), ValidationError> {
    require(&candidate.name, Field::Name)?;
    require(&candidate.username, Field::Username)?;
    require(&candidate.email, Field::Email)?;
    if candidate.password.is_empty() {
        return Err(ValidationError::missing(Field::Password));
    }
    Ok(())
}

async fn ensure_unique(
    conn: &libsql::Connection,
    column: UniqueColumn,
    value: &str,
    exclude_id: Option<&str>,
) -> Result<(), RecordError> {
    let mut rows = conn
        .query(column.sql(), libsql::params![value, exclude_id])
        .await?;
    if rows.next().await?.is_some() {
        return Err(ValidationError::duplicate(column.field()).into());
    }
    Ok(())
}
