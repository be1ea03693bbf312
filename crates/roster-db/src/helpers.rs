//! Row-to-entity parsing helpers.
//!
//! Every repo converts `libsql::Row` (column-indexed) into typed entity
//! structs. These helpers isolate the parsing logic and handle the dual
//! datetime format (`SQLite`'s `datetime('now')` vs Rust's `to_rfc3339()`).

use chrono::{DateTime, NaiveDate, Utc};
use roster_core::enums::Grade;

use crate::error::StorageError;

/// Storage format for dates of birth.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `StorageError::InvalidRow` if the string matches neither format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StorageError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| StorageError::InvalidRow(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse a `YYYY-MM-DD` TEXT column.
///
/// # Errors
///
/// Returns `StorageError::InvalidRow` if the string is not a valid date.
pub fn parse_date(s: &str) -> Result<NaiveDate, StorageError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| StorageError::InvalidRow(format!("Failed to parse date '{s}': {e}")))
}

#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored grade label.
///
/// # Errors
///
/// Returns `StorageError::InvalidRow` for labels outside the grade scale.
pub fn parse_grade(s: &str) -> Result<Grade, StorageError> {
    Grade::parse(s).ok_or_else(|| StorageError::InvalidRow(format!("Unknown grade label '{s}'")))
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with roster-core enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `StorageError::InvalidRow` if the string does not match any variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, StorageError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| StorageError::InvalidRow(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read an INTEGER column holding 0/1 as a bool.
///
/// # Errors
///
/// Returns `StorageError` if the column read fails.
pub fn get_bool(row: &libsql::Row, idx: i32) -> Result<bool, StorageError> {
    Ok(row.get::<i64>(idx)? != 0)
}

/// Generate a prefixed ID via libSQL. Returns e.g. `"stu-a3f8b2c1"`.
///
/// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
/// Runs on whatever connection (or open transaction) it is given.
///
/// # Errors
///
/// Returns `StorageError` if the query fails or returns no rows.
pub async fn generate_id(conn: &libsql::Connection, prefix: &str) -> Result<String, StorageError> {
    let mut rows = conn
        .query("SELECT ?1 || '-' || lower(hex(randomblob(4)))", [prefix])
        .await?;
    let row = rows.next().await?.ok_or(StorageError::NoResult)?;
    Ok(row.get::<String>(0)?)
}

/// Run a `SELECT COUNT(*)`-style query and return the single integer.
///
/// # Errors
///
/// Returns `StorageError` if the query fails or returns no rows.
pub async fn query_count(
    conn: &libsql::Connection,
    sql: &str,
    params: impl libsql::params::IntoParams,
) -> Result<u64, StorageError> {
    let mut rows = conn.query(sql, params).await?;
    let row = rows.next().await?.ok_or(StorageError::NoResult)?;
    let count = row.get::<i64>(0)?;
    u64::try_from(count).map_err(|_| StorageError::InvalidRow(format!("negative count {count}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::enums::Role;
    use roster_core::ids::{ALL_PREFIXES, has_prefix};
    use std::collections::HashSet;

    #[test]
    fn parses_both_datetime_formats() {
        let a = parse_datetime("2026-02-09T14:30:00+00:00").unwrap();
        let b = parse_datetime("2026-02-09 14:30:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn date_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2004, 2, 29).unwrap();
        assert_eq!(parse_date(&format_date(date)).unwrap(), date);
        assert!(parse_date("2003-02-29").is_err());
    }

    #[test]
    fn grade_and_enum_parsing() {
        assert_eq!(parse_grade("A+").unwrap(), Grade::APlus);
        assert!(matches!(parse_grade("Z"), Err(StorageError::InvalidRow(_))));
        assert_eq!(parse_enum::<Role>("teacher").unwrap(), Role::Teacher);
        assert!(parse_enum::<Role>("student").is_err());
    }

    #[tokio::test]
    async fn generate_id_format_and_uniqueness() {
        let store = crate::RecordStore::open_local(":memory:").await.unwrap();
        let conn = store.lock().await;

        for prefix in ALL_PREFIXES {
            let id = generate_id(&conn, prefix).await.unwrap();
            assert!(has_prefix(&id, prefix), "bad id {id}");
        }

        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = generate_id(&conn, "tst").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }
}
