//! Shared test utilities.

#[cfg(test)]
pub(crate) mod helpers {
    use chrono::NaiveDate;
    use roster_config::RosterConfig;
    use roster_core::entities::{NewAccount, NewStudent};

    use crate::RecordStore;
    use crate::service::RosterService;

    /// In-memory service with default policies.
    pub async fn test_service() -> RosterService {
        RosterService::new_local(":memory:").await.unwrap()
    }

    /// In-memory service that rejects subject scores outside `0..=100`.
    pub async fn test_service_enforcing_range() -> RosterService {
        let store = RecordStore::open_local(":memory:").await.unwrap();
        let mut config = RosterConfig::default();
        config.scores.enforce_range = true;
        RosterService::from_store(store, &config)
    }

    /// Register a mentor account with predictable email and password.
    pub async fn seed_mentor(svc: &RosterService, username: &str) {
        svc.register_account(NewAccount {
            name: format!("Mentor {username}"),
            username: username.to_string(),
            email: format!("{username}@example.edu"),
            password: format!("{username}-password"),
            role: None,
        })
        .await
        .unwrap();
    }

    /// A valid student profile whose unique fields derive from `roll_no`.
    pub fn new_student(mentor: &str, roll_no: &str) -> NewStudent {
        NewStudent {
            name: format!("Student {roll_no}"),
            roll_no: roll_no.to_string(),
            email: format!("{}@example.edu", roll_no.to_lowercase()),
            phone: format!("phone-{roll_no}"),
            address: "1 College Road".to_string(),
            dob: NaiveDate::from_ymd_opt(2003, 6, 15).unwrap(),
            semester: 3,
            branch: "CSE".to_string(),
            mentor: mentor.to_string(),
        }
    }

    /// Count rows in a table, bypassing the service.
    pub async fn count_rows(svc: &RosterService, table: &str) -> i64 {
        let conn = svc.store().lock().await;
        let mut rows = conn
            .query(&format!("SELECT COUNT(*) FROM {table}"), ())
            .await
            .unwrap();
        rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
    }
}
