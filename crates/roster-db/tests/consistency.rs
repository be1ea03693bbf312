//! Consistency coordinator integration tests.
//!
//! Exercises the public API only: concurrent creation races, delete/update
//! races, file-backed persistence, and configuration-driven construction.

use std::sync::mpsc;
use std::time::Duration;

use chrono::NaiveDate;
use tempfile::TempDir;

use roster_config::{LoggingConfig, RosterConfig};
use roster_core::entities::{NewAccount, NewStudent};
use roster_core::enums::{Field, Grade};
use roster_core::errors::ValidationError;
use roster_core::grading::SubjectScores;
use roster_db::error::RecordError;
use roster_db::service::RosterService;
use roster_db::updates::scores::ScoreSubmission;
use roster_db::updates::student::StudentUpdateBuilder;

fn init_logging() {
    // Only the first call in this binary installs the subscriber.
    let _ = roster_config::logging::init_tracing(&LoggingConfig {
        filter: "roster_db=debug".into(),
    });
}

async fn mentor(svc: &RosterService, username: &str) {
    svc.register_account(NewAccount {
        name: format!("Mentor {username}"),
        username: username.into(),
        email: format!("{username}@example.edu"),
        password: "pw".into(),
        role: None,
    })
    .await
    .unwrap();
}

fn student(roll_no: &str, email: &str, phone: &str) -> NewStudent {
    NewStudent {
        name: format!("Student {roll_no}"),
        roll_no: roll_no.into(),
        email: email.into(),
        phone: phone.into(),
        address: "1 College Road".into(),
        dob: NaiveDate::from_ymd_opt(2004, 8, 1).unwrap(),
        semester: 1,
        branch: "IT".into(),
        mentor: "asha".into(),
    }
}

async fn file_service(dir: &TempDir) -> RosterService {
    let path = dir.path().join("roster.db");
    RosterService::new_local(path.to_str().unwrap()).await.unwrap()
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_creates_on_one_service_admit_exactly_one() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let svc = file_service(&dir).await;
    mentor(&svc, "asha").await;

    let (a, b) = tokio::join!(
        svc.create_student(student("R1", "a@example.edu", "111")),
        svc.create_student(student("R1", "b@example.edu", "222")),
    );

    let outcomes = [a, b];
    let successes = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one create should win: {outcomes:?}");

    let failure = outcomes.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(failure.validation(), Some(&ValidationError::duplicate(Field::RollNo)));

    assert_eq!(svc.count_students().await.unwrap(), 1);
}

/// A second store on the same file waits for the first store's write
/// transaction, then sees its row and reports the duplicate.
#[tokio::test]
async fn second_store_on_same_file_waits_and_reports_duplicate() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("roster.db").to_string_lossy().into_owned();

    let first = RosterService::new_local(&path).await.unwrap();
    mentor(&first, "asha").await;

    let (ready_tx, ready_rx) = mpsc::channel();
    let (go_tx, go_rx) = mpsc::channel();
    let other_path = path.clone();
    let contender = std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let second = RosterService::new_local(&other_path).await.unwrap();
            ready_tx.send(()).unwrap();
            go_rx.recv().unwrap();
            second
                .create_student(student("R1", "b@example.edu", "222"))
                .await
        })
    });
    ready_rx.recv().unwrap();

    // Hold the write lock with the winning row uncommitted.
    let tx = first.store().begin().await.unwrap();
    tx.execute_batch(
        "INSERT INTO students (id, name, roll_no, email, phone, address, dob, semester, branch, mentor) \
             VALUES ('stu-0000000a', 'Held', 'R1', 'a@example.edu', '111', 'addr', '2004-08-01', 1, 'IT', 'asha'); \
         INSERT INTO score_records (id, student_id) VALUES ('scr-0000000a', 'stu-0000000a');",
    )
    .await
    .unwrap();
    go_tx.send(()).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    tx.finish(Ok::<(), RecordError>(())).await.unwrap();

    let err = contender.join().unwrap().unwrap_err();
    assert_eq!(err.validation(), Some(&ValidationError::duplicate(Field::RollNo)));
    assert_eq!(first.count_students().await.unwrap(), 1);
}

#[tokio::test]
async fn interleaved_creates_each_get_a_score_record() {
    let svc = RosterService::new_local(":memory:").await.unwrap();
    mentor(&svc, "asha").await;

    let (a, b, c, d) = tokio::join!(
        svc.create_student(student("R1", "s1@example.edu", "91")),
        svc.create_student(student("R2", "s2@example.edu", "92")),
        svc.create_student(student("R3", "s3@example.edu", "93")),
        svc.create_student(student("R4", "s4@example.edu", "94")),
    );
    for result in [a, b, c, d] {
        result.unwrap();
    }

    let listed = svc.list_students_for_mentor("asha").await.unwrap();
    assert_eq!(listed.len(), 4);
    for record in &listed {
        assert_eq!(record.scores.student_id, record.student.id);
        assert_eq!(record.scores.grade, Grade::F);
    }
}

#[tokio::test]
async fn delete_racing_update_never_leaves_half_a_student() {
    let svc = RosterService::new_local(":memory:").await.unwrap();
    mentor(&svc, "asha").await;
    let created = svc
        .create_student(student("R1", "a@example.edu", "111"))
        .await
        .unwrap();

    let (deleted, updated) = tokio::join!(
        svc.delete_student(&created.id),
        svc.update_scores(&created.id, ScoreSubmission::new(SubjectScores::uniform(75))),
    );

    assert_eq!(deleted.unwrap(), 1);
    match updated {
        // Update committed first; the delete then removed the updated row.
        Ok(record) => assert_eq!(record.scores.grade, Grade::B),
        Err(err) => assert!(matches!(err, RecordError::NotFound { .. }), "{err:?}"),
    }

    assert!(matches!(
        svc.get_student(&created.id).await,
        Err(RecordError::NotFound { .. })
    ));
    assert_eq!(svc.count_students().await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_lifecycle_create_update_delete() {
    let svc = RosterService::new_local(":memory:").await.unwrap();
    mentor(&svc, "asha").await;
    mentor(&svc, "vikram").await;

    let created = svc
        .create_student(student("R1", "a@example.edu", "111"))
        .await
        .unwrap();
    let fresh = svc.get_student(&created.id).await.unwrap();
    assert_eq!(
        (fresh.scores.total, fresh.scores.percentage, fresh.scores.grade),
        (0, 0, Grade::F)
    );

    svc.update_profile(&created.id, StudentUpdateBuilder::new().mentor("vikram").build())
        .await
        .unwrap();
    let scored = svc
        .update_scores(&created.id, ScoreSubmission::new(SubjectScores::new(80, 90, 85, 70, 60, 95)))
        .await
        .unwrap();
    assert_eq!(scored.student.mentor, "vikram");
    assert_eq!(scored.scores.total, 480);
    assert_eq!(scored.scores.grade, Grade::A);

    assert_eq!(svc.delete_student(&created.id).await.unwrap(), 1);
    assert_eq!(svc.delete_student(&created.id).await.unwrap(), 0);
    assert_eq!(svc.count_students_for_mentor("vikram").await.unwrap(), 0);
}

#[tokio::test]
async fn records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let id = {
        let svc = file_service(&dir).await;
        mentor(&svc, "asha").await;
        let created = svc
            .create_student(student("R1", "a@example.edu", "111"))
            .await
            .unwrap();
        svc.update_scores(&created.id, ScoreSubmission::new(SubjectScores::uniform(95)))
            .await
            .unwrap();
        created.id
    };

    let svc = file_service(&dir).await;
    let record = svc.get_student(&id).await.unwrap();
    assert_eq!(record.scores.total, 570);
    assert_eq!(record.scores.grade, Grade::APlus);
    assert_eq!(svc.get_account("asha").await.unwrap().username, "asha");
}

#[tokio::test]
async fn service_from_config_applies_range_policy() {
    let dir = TempDir::new().unwrap();
    let mut config = RosterConfig::default();
    config.database.path = dir.path().join("cfg.db").to_string_lossy().into_owned();
    config.scores.enforce_range = true;
    config.scores.max_subject_score = 50;
    config.validate().unwrap();

    let svc = RosterService::from_config(&config).await.unwrap();
    mentor(&svc, "asha").await;
    let created = svc
        .create_student(student("R1", "a@example.edu", "111"))
        .await
        .unwrap();

    let err = svc
        .update_scores(&created.id, ScoreSubmission::new(SubjectScores::uniform(60)))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordError::Validation(_)));
    assert!(!err.is_transient());

    svc.update_scores(&created.id, ScoreSubmission::new(SubjectScores::uniform(50)))
        .await
        .unwrap();
}
