//! Entity structs for accounts, students, and score records.
//!
//! Each entity maps to a table in the libSQL record store. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` for JSON roundtrip and schema
//! validation at the caller boundary.

mod account;
mod score;
mod student;

pub use account::{Account, NewAccount};
pub use score::ScoreRecord;
pub use student::{NewStudent, Student, StudentRecord};
