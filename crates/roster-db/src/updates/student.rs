//! Student profile update builder.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Changed profile attributes. The ID, the roll number, and the score record
/// are not reachable from here; a `roll_no` key in a payload is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentor: Option<String>,
}

impl StudentUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.dob.is_none()
            && self.semester.is_none()
            && self.branch.is_none()
            && self.mentor.is_none()
    }
}

pub struct StudentUpdateBuilder(StudentUpdate);

impl StudentUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(StudentUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.0.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.0.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.0.address = Some(address.into());
        self
    }

    #[must_use]
    pub const fn dob(mut self, dob: NaiveDate) -> Self {
        self.0.dob = Some(dob);
        self
    }

    #[must_use]
    pub const fn semester(mut self, semester: i64) -> Self {
        self.0.semester = Some(semester);
        self
    }

    #[must_use]
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.0.branch = Some(branch.into());
        self
    }

    #[must_use]
    pub fn mentor(mut self, mentor: impl Into<String>) -> Self {
        self.0.mentor = Some(mentor.into());
        self
    }

    #[must_use]
    pub fn build(self) -> StudentUpdate {
        self.0
    }
}

impl Default for StudentUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
