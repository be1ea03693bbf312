//! Score repository: the only write path for a student's score record.
//!
//! Derived fields are computed here from the six submitted scores on every
//! write. Caller-supplied `total`/`percentage`/`grade` values are discarded.

use roster_core::entities::{ScoreRecord, StudentRecord};
use roster_core::grading::{Evaluation, SubjectScores, evaluate};

use crate::error::{RecordError, StorageError};
use crate::helpers::parse_grade;
use crate::repos::student::{apply_profile_update, fetch_student, integrity_fault, load_record};
use crate::service::RosterService;
use crate::updates::scores::ScoreSubmission;
use crate::validator;

pub(crate) const SCORE_COLS: &str =
    "id, student_id, osd, dsa, python, pd, ose, dba, total, percentage, grade";

/// Decode score columns starting at `base` (non-zero when joined after
/// student columns).
pub(crate) fn row_to_score_record(row: &libsql::Row, base: i32) -> Result<ScoreRecord, StorageError> {
    Ok(ScoreRecord {
        id: row.get(base)?,
        student_id: row.get(base + 1)?,
        scores: SubjectScores {
            osd: row.get(base + 2)?,
            dsa: row.get(base + 3)?,
            python: row.get(base + 4)?,
            pd: row.get(base + 5)?,
            ose: row.get(base + 6)?,
            dba: row.get(base + 7)?,
        },
        total: row.get(base + 8)?,
        percentage: row.get(base + 9)?,
        grade: parse_grade(&row.get::<String>(base + 10)?)?,
    })
}

async fn update_scores_in(
    conn: &libsql::Connection,
    id: &str,
    submission: &ScoreSubmission,
    derived: &Evaluation,
) -> Result<StudentRecord, RecordError> {
    let current = fetch_student(conn, id)
        .await?
        .ok_or_else(|| RecordError::not_found(id))?;

    if !submission.profile.is_empty() {
        validator::validate_profile_change(conn, &current, &submission.profile).await?;
        apply_profile_update(conn, id, &submission.profile).await?;
    }

    let scores = &submission.scores;
    let rows = conn
        .execute(
            "UPDATE score_records
             SET osd = ?1, dsa = ?2, python = ?3, pd = ?4, ose = ?5, dba = ?6,
                 total = ?7, percentage = ?8, grade = ?9, updated_at = datetime('now')
             WHERE student_id = ?10",
            libsql::params![
                scores.osd,
                scores.dsa,
                scores.python,
                scores.pd,
                scores.ose,
                scores.dba,
                derived.total,
                derived.percentage,
                derived.grade.as_str(),
                id
            ],
        )
        .await?;
    if rows == 0 {
        return Err(integrity_fault(id));
    }

    load_record(conn, id).await
}

impl RosterService {
    /// Replace a student's six subject scores, recompute the derived fields,
    /// and apply any bundled profile changes, all in one transaction.
    ///
    /// # Errors
    ///
    /// - `RecordError::Validation` if a subject is out of range (when the
    ///   range policy is on) or a bundled profile change breaks a constraint.
    /// - `RecordError::NotFound` if no student has this ID.
    /// - `RecordError::IntegrityFault` if the student has no score record;
    ///   bundled profile changes are rolled back with it.
    pub async fn update_scores(
        &self,
        student_id: &str,
        submission: ScoreSubmission,
    ) -> Result<StudentRecord, RecordError> {
        tracing::debug!(student_id, "update_scores");
        validator::validate_score_range(&submission.scores, self.score_policy())?;

        let derived = evaluate(&submission.scores);
        if submission.has_claimed_derived() {
            if submission.claims_differ_from(&derived) {
                tracing::warn!(
                    student_id,
                    claimed_total = ?submission.total,
                    claimed_percentage = ?submission.percentage,
                    claimed_grade = ?submission.grade,
                    total = derived.total,
                    grade = %derived.grade,
                    "discarding caller-supplied derived score fields"
                );
            } else {
                tracing::debug!(student_id, "caller-supplied derived fields match; recomputed");
            }
        }

        let tx = self.store().begin().await?;
        let result = update_scores_in(&tx, student_id, &submission, &derived).await;
        let record = tx.finish(result).await?;

        tracing::info!(
            student_id,
            total = record.scores.total,
            grade = %record.scores.grade,
            "scores updated"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{
        new_student, seed_mentor, test_service, test_service_enforcing_range,
    };
    use crate::updates::student::StudentUpdateBuilder;
    use pretty_assertions::assert_eq;
    use roster_core::enums::{Field, Grade, Subject};
    use roster_core::errors::ValidationError;

    async fn service_with_student() -> (RosterService, String) {
        let svc = test_service().await;
        seed_mentor(&svc, "asha").await;
        let student = svc.create_student(new_student("asha", "R1")).await.unwrap();
        (svc, student.id)
    }

    #[tokio::test]
    async fn mixed_scores_are_evaluated_and_stored() {
        let (svc, id) = service_with_student().await;

        let record = svc
            .update_scores(&id, ScoreSubmission::new(SubjectScores::new(80, 90, 85, 70, 60, 95)))
            .await
            .unwrap();
        assert_eq!(record.scores.total, 480);
        assert_eq!(record.scores.percentage, 80);
        assert_eq!(record.scores.grade, Grade::A);

        let reread = svc.get_student(&id).await.unwrap();
        assert_eq!(reread, record);
    }

    #[tokio::test]
    async fn uniform_fifty_stores_a_d() {
        let (svc, id) = service_with_student().await;
        let record = svc
            .update_scores(&id, ScoreSubmission::new(SubjectScores::uniform(50)))
            .await
            .unwrap();
        assert_eq!(record.scores.evaluation(), evaluate(&SubjectScores::uniform(50)));
        assert_eq!(record.scores.grade, Grade::D);
    }

    #[tokio::test]
    async fn caller_supplied_derived_fields_are_ignored() {
        let (svc, id) = service_with_student().await;

        let submission: ScoreSubmission = serde_json::from_value(serde_json::json!({
            "osd": 50, "dsa": 50, "python": 50, "pd": 50, "ose": 50, "dba": 50,
            "total": 999, "percentage": 100, "grade": "A+"
        }))
        .unwrap();
        let record = svc.update_scores(&id, submission).await.unwrap();

        assert_eq!(record.scores.total, 300);
        assert_eq!(record.scores.percentage, 50);
        assert_eq!(record.scores.grade, Grade::D);
    }

    #[tokio::test]
    async fn matching_derived_claims_store_the_computed_values() {
        let (svc, id) = service_with_student().await;

        let mut submission = ScoreSubmission::new(SubjectScores::uniform(50));
        submission.total = Some(300);
        submission.grade = Some("D".into());
        let record = svc.update_scores(&id, submission).await.unwrap();

        assert_eq!(record.scores.evaluation(), evaluate(&SubjectScores::uniform(50)));
    }

    #[tokio::test]
    async fn extreme_subject_score_is_stored_without_overflow() {
        let (svc, id) = service_with_student().await;

        let submission: ScoreSubmission = serde_json::from_value(serde_json::json!({
            "osd": 100_000_000_000_000_000_i64, "dsa": 0, "python": 0, "pd": 0, "ose": 0, "dba": 0
        }))
        .unwrap();
        let record = svc.update_scores(&id, submission).await.unwrap();

        assert_eq!(record.scores.total, 100_000_000_000_000_000);
        assert_eq!(record.scores.percentage, 16_666_666_666_666_667);
        assert_eq!(record.scores.grade, Grade::APlus);
        assert_eq!(svc.get_student(&id).await.unwrap(), record);
    }

    #[tokio::test]
    async fn bundled_profile_changes_commit_with_scores() {
        let (svc, id) = service_with_student().await;

        let submission = ScoreSubmission::new(SubjectScores::uniform(90))
            .with_profile(StudentUpdateBuilder::new().semester(6).build());
        let record = svc.update_scores(&id, submission).await.unwrap();

        assert_eq!(record.student.semester, 6);
        assert_eq!(record.scores.grade, Grade::APlus);
    }

    #[tokio::test]
    async fn missing_student_is_not_found() {
        let svc = test_service().await;
        let err = svc
            .update_scores("stu-00000000", ScoreSubmission::new(SubjectScores::uniform(10)))
            .await
            .unwrap_err();
        assert!(matches!(err, RecordError::NotFound { .. }));
    }

    #[tokio::test]
    async fn missing_score_record_rolls_back_profile_changes() {
        let (svc, id) = service_with_student().await;
        {
            let conn = svc.store().lock().await;
            conn.execute("DELETE FROM score_records WHERE student_id = ?1", [id.as_str()])
                .await
                .unwrap();
        }

        let submission = ScoreSubmission::new(SubjectScores::uniform(70))
            .with_profile(StudentUpdateBuilder::new().name("Should Not Stick").build());
        let err = svc.update_scores(&id, submission).await.unwrap_err();
        assert!(matches!(err, RecordError::IntegrityFault { .. }));

        let conn = svc.store().lock().await;
        let student = fetch_student(&conn, &id).await.unwrap().unwrap();
        assert_eq!(student.name, "Student R1");
    }

    #[tokio::test]
    async fn invalid_bundled_profile_leaves_scores_untouched() {
        let (svc, id) = service_with_student().await;

        let submission = ScoreSubmission::new(SubjectScores::uniform(70))
            .with_profile(StudentUpdateBuilder::new().mentor("ghost").build());
        let err = svc.update_scores(&id, submission).await.unwrap_err();
        assert_eq!(err.validation(), Some(&ValidationError::unknown_mentor()));

        let record = svc.get_student(&id).await.unwrap();
        assert_eq!(record.scores.total, 0);
        assert_eq!(record.student.mentor, "asha");
    }

    #[tokio::test]
    async fn out_of_range_scores_pass_through_by_default() {
        let (svc, id) = service_with_student().await;
        let record = svc
            .update_scores(&id, ScoreSubmission::new(SubjectScores::new(120, 0, 0, 0, 0, 0)))
            .await
            .unwrap();
        assert_eq!(record.scores.total, 120);
        assert_eq!(record.scores.percentage, 20);
    }

    #[tokio::test]
    async fn range_policy_rejects_before_writing() {
        let svc = test_service_enforcing_range().await;
        seed_mentor(&svc, "asha").await;
        let student = svc.create_student(new_student("asha", "R1")).await.unwrap();

        let err = svc
            .update_scores(&student.id, ScoreSubmission::new(SubjectScores::new(10, 10, 10, 10, 10, -1)))
            .await
            .unwrap_err();
        assert_eq!(
            err.validation(),
            Some(&ValidationError::out_of_range(Field::Subject(Subject::Dba)))
        );

        let record = svc.get_student(&student.id).await.unwrap();
        assert_eq!(record.scores.scores, SubjectScores::default());
    }
}
