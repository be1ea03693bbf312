//! ID prefix constants.
//!
//! IDs are generated by the record store as `{prefix}-{8 hex chars}`,
//! e.g. `stu-a3f8b2c1`.

pub const PREFIX_ACCOUNT: &str = "acc";
pub const PREFIX_STUDENT: &str = "stu";
pub const PREFIX_SCORE_RECORD: &str = "scr";

/// Every prefix the store hands out.
pub const ALL_PREFIXES: &[&str] = &[PREFIX_ACCOUNT, PREFIX_STUDENT, PREFIX_SCORE_RECORD];

/// Check whether `id` carries the given prefix and a well-formed hex suffix.
#[must_use]
pub fn has_prefix(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|hex| hex.len() == 8 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
