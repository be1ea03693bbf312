use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ScoreRecord;

/// A student assigned to a mentor account.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub roll_no: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub dob: NaiveDate,
    pub semester: i64,
    pub branch: String,
    /// Username of the owning mentor account.
    pub mentor: String,
}

/// Profile input for creating a student. The store assigns the ID.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub roll_no: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub dob: NaiveDate,
    pub semester: i64,
    pub branch: String,
    pub mentor: String,
}

/// A student joined with its score record, as returned by the read path.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StudentRecord {
    pub student: Student,
    pub scores: ScoreRecord,
}
