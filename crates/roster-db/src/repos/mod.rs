//! Repository modules implementing the coordinator's operations.
//!
//! Each module adds methods to `RosterService` via `impl RosterService` blocks.

pub mod account;
pub mod scores;
pub mod student;
