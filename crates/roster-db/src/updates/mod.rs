//! Update payload types for student mutations.
//!
//! Profile updates carry `Option` fields; only `Some` fields generate SET
//! clauses in the dynamic UPDATE SQL. Score submissions carry all six subject
//! scores and may bundle profile changes for the same transaction.

pub mod scores;
pub mod student;
