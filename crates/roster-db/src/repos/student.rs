//! Student repository: create, profile update, delete, and the read path.

use roster_core::entities::{NewStudent, Student, StudentRecord};
use roster_core::grading::{SubjectScores, evaluate};
use roster_core::ids::{PREFIX_SCORE_RECORD, PREFIX_STUDENT};

use crate::error::{RecordError, StorageError};
use crate::helpers::{format_date, generate_id, parse_date, query_count};
use crate::repos::scores::{SCORE_COLS, row_to_score_record};
use crate::service::RosterService;
use crate::updates::student::StudentUpdate;
use crate::validator;

pub(crate) const STUDENT_COLS: &str =
    "id, name, roll_no, email, phone, address, dob, semester, branch, mentor";

/// Number of columns in `STUDENT_COLS`; joined score columns start here.
const STUDENT_COL_COUNT: i32 = 10;

pub(crate) fn row_to_student(row: &libsql::Row) -> Result<Student, StorageError> {
    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        roll_no: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        address: row.get(5)?,
        dob: parse_date(&row.get::<String>(6)?)?,
        semester: row.get(7)?,
        branch: row.get(8)?,
        mentor: row.get(9)?,
    })
}

/// Log and build the error for a student whose score record is missing.
pub(crate) fn integrity_fault(student_id: &str) -> RecordError {
    tracing::error!(student_id, "student has no score record");
    RecordError::missing_score_record(student_id)
}

pub(crate) async fn fetch_student(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Option<Student>, RecordError> {
    let mut rows = conn
        .query(&format!("SELECT {STUDENT_COLS} FROM students WHERE id = ?1"), [id])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_student(&row)?)),
        None => Ok(None),
    }
}

/// Student plus its score record, read on one connection.
pub(crate) async fn load_record(
    conn: &libsql::Connection,
    id: &str,
) -> Result<StudentRecord, RecordError> {
    let student = fetch_student(conn, id)
        .await?
        .ok_or_else(|| RecordError::not_found(id))?;

    let mut rows = conn
        .query(
            &format!("SELECT {SCORE_COLS} FROM score_records WHERE student_id = ?1"),
            [id],
        )
        .await?;
    let row = rows.next().await?.ok_or_else(|| integrity_fault(id))?;
    let scores = row_to_score_record(&row, 0)?;
    Ok(StudentRecord { student, scores })
}

async fn insert_student(
    conn: &libsql::Connection,
    input: &NewStudent,
) -> Result<Student, RecordError> {
    validator::validate_new_student(conn, input).await?;

    let id = generate_id(conn, PREFIX_STUDENT).await?;
    conn.execute(
        &format!(
            "INSERT INTO students ({STUDENT_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        ),
        libsql::params![
            id.as_str(),
            input.name.as_str(),
            input.roll_no.as_str(),
            input.email.as_str(),
            input.phone.as_str(),
            input.address.as_str(),
            format_date(input.dob),
            input.semester,
            input.branch.as_str(),
            input.mentor.as_str()
        ],
    )
    .await
    .map_err(RecordError::from_student_write)?;

    let initial = SubjectScores::default();
    let derived = evaluate(&initial);
    let score_id = generate_id(conn, PREFIX_SCORE_RECORD).await?;
    conn.execute(
        "INSERT INTO score_records (id, student_id, osd, dsa, python, pd, ose, dba, total, percentage, grade)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        libsql::params![
            score_id.as_str(),
            id.as_str(),
            initial.osd,
            initial.dsa,
            initial.python,
            initial.pd,
            initial.ose,
            initial.dba,
            derived.total,
            derived.percentage,
            derived.grade.as_str()
        ],
    )
    .await
    .map_err(|e| RecordError::from_score_write(e, &id))?;

    Ok(Student {
        id,
        name: input.name.clone(),
        roll_no: input.roll_no.clone(),
        email: input.email.clone(),
        phone: input.phone.clone(),
        address: input.address.clone(),
        dob: input.dob,
        semester: input.semester,
        branch: input.branch.clone(),
        mentor: input.mentor.clone(),
    })
}

/// Write the `Some` fields of `update`. Returns rows affected.
pub(crate) async fn apply_profile_update(
    conn: &libsql::Connection,
    id: &str,
    update: &StudentUpdate,
) -> Result<u64, RecordError> {
    let mut sets = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();
    let mut idx = 1usize;

    let text_fields = [
        ("name", &update.name),
        ("email", &update.email),
        ("phone", &update.phone),
        ("address", &update.address),
        ("branch", &update.branch),
        ("mentor", &update.mentor),
    ];
    for (column, value) in text_fields {
        if let Some(value) = value {
            sets.push(format!("{column} = ?{idx}"));
            params.push(value.clone().into());
            idx += 1;
        }
    }
    if let Some(dob) = update.dob {
        sets.push(format!("dob = ?{idx}"));
        params.push(format_date(dob).into());
        idx += 1;
    }
    if let Some(semester) = update.semester {
        sets.push(format!("semester = ?{idx}"));
        params.push(semester.into());
        idx += 1;
    }

    if sets.is_empty() {
        return Ok(0);
    }

    sets.push("updated_at = datetime('now')".to_string());
    params.push(id.into());
    let sql = format!("UPDATE students SET {} WHERE id = ?{idx}", sets.join(", "));
    conn.execute(&sql, libsql::params_from_iter(params))
        .await
        .map_err(RecordError::from_student_write)
}

async fn update_profile_in(
    conn: &libsql::Connection,
    id: &str,
    update: &StudentUpdate,
) -> Result<Student, RecordError> {
    let current = fetch_student(conn, id)
        .await?
        .ok_or_else(|| RecordError::not_found(id))?;
    if update.is_empty() {
        return Ok(current);
    }

    validator::validate_profile_change(conn, &current, update).await?;
    apply_profile_update(conn, id, update).await?;

    if let Some(mentor) = update.mentor.as_deref().filter(|m| *m != current.mentor) {
        tracing::info!(student_id = id, from = %current.mentor, to = mentor, "student mentor changed");
    }

    fetch_student(conn, id)
        .await?
        .ok_or_else(|| RecordError::not_found(id))
}

async fn delete_in(conn: &libsql::Connection, id: &str) -> Result<u64, RecordError> {
    conn.execute("DELETE FROM score_records WHERE student_id = ?1", [id])
        .await?;
    Ok(conn.execute("DELETE FROM students WHERE id = ?1", [id]).await?)
}

impl RosterService {
    /// Create a student and its zeroed score record in one transaction.
    ///
    /// # Errors
    ///
    /// `RecordError::Validation` for a duplicate roll number, email, or phone,
    /// a blank required field, or an unknown mentor. Nothing is written.
    pub async fn create_student(&self, input: NewStudent) -> Result<Student, RecordError> {
        tracing::debug!(roll_no = %input.roll_no, mentor = %input.mentor, "create_student");

        let tx = self.store().begin().await?;
        let result = insert_student(&tx, &input).await;
        let student = tx.finish(result).await?;

        tracing::info!(student_id = %student.id, mentor = %student.mentor, "student created");
        Ok(student)
    }

    /// Update profile attributes only. The score record is untouched.
    ///
    /// # Errors
    ///
    /// `RecordError::NotFound` if no student has this ID;
    /// `RecordError::Validation` if a changed field breaks a constraint.
    pub async fn update_profile(
        &self,
        student_id: &str,
        update: StudentUpdate,
    ) -> Result<Student, RecordError> {
        tracing::debug!(student_id, "update_profile");

        let tx = self.store().begin().await?;
        let result = update_profile_in(&tx, student_id, &update).await;
        let student = tx.finish(result).await?;

        tracing::info!(student_id, "student profile updated");
        Ok(student)
    }

    /// Delete a student and its score record. Returns the number of student
    /// rows removed; deleting an absent student succeeds with `0`.
    ///
    /// # Errors
    ///
    /// `RecordError::Storage` on a genuine storage fault.
    pub async fn delete_student(&self, student_id: &str) -> Result<u64, RecordError> {
        let tx = self.store().begin().await?;
        let result = delete_in(&tx, student_id).await;
        let rows = tx.finish(result).await?;

        if rows == 0 {
            tracing::debug!(student_id, "delete_student: nothing to delete");
        } else {
            tracing::info!(student_id, rows, "student deleted");
        }
        Ok(rows)
    }

    /// Fetch a student together with its score record.
    ///
    /// # Errors
    ///
    /// `RecordError::NotFound` if no student has this ID;
    /// `RecordError::IntegrityFault` if the student has no score record.
    pub async fn get_student(&self, student_id: &str) -> Result<StudentRecord, RecordError> {
        let conn = self.store().lock().await;
        load_record(&conn, student_id).await
    }

    /// All students owned by `mentor`, with score records, ordered by roll number.
    ///
    /// # Errors
    ///
    /// `RecordError::IntegrityFault` if any listed student has no score record.
    pub async fn list_students_for_mentor(
        &self,
        mentor: &str,
    ) -> Result<Vec<StudentRecord>, RecordError> {
        let conn = self.store().lock().await;
        let student_cols = prefixed("s", STUDENT_COLS);
        let score_cols = prefixed("r", SCORE_COLS);
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {student_cols}, {score_cols} FROM students s \
                     LEFT JOIN score_records r ON r.student_id = s.id \
                     WHERE s.mentor = ?1 ORDER BY s.roll_no"
                ),
                [mentor],
            )
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            let student = row_to_student(&row)?;
            if row.get::<Option<String>>(STUDENT_COL_COUNT)?.is_none() {
                return Err(integrity_fault(&student.id));
            }
            let scores = row_to_score_record(&row, STUDENT_COL_COUNT)?;
            records.push(StudentRecord { student, scores });
        }
        Ok(records)
    }

    /// Number of students owned by `mentor`.
    ///
    /// # Errors
    ///
    /// `RecordError::Storage` if the query fails.
    pub async fn count_students_for_mentor(&self, mentor: &str) -> Result<u64, RecordError> {
        let conn = self.store().lock().await;
        Ok(query_count(&conn, "SELECT COUNT(*) FROM students WHERE mentor = ?1", [mentor]).await?)
    }

    /// Number of students across all mentors.
    ///
    /// # Errors
    ///
    /// `RecordError::Storage` if the query fails.
    pub async fn count_students(&self) -> Result<u64, RecordError> {
        let conn = self.store().lock().await;
        Ok(query_count(&conn, "SELECT COUNT(*) FROM students", ()).await?)
    }
}

/// Qualify a comma-separated column list with a table alias.
fn prefixed(alias: &str, cols: &str) -> String {
    cols.split(", ")
        .map(|col| format!("{alias}.{col}"))
        .collect::<Vec<_>>()
        .join(", ")
}
