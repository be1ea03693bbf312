//! # roster-core
//!
//! Core types, grade evaluation, and validation errors for mentor-owned
//! student records.
//!
//! This crate provides the foundational types shared by the other roster crates:
//! - Entity structs for accounts, students, and score records
//! - Enums for grades, roles, subjects, and validated fields
//! - The pure grade evaluator (six subject scores to total, percentage, grade)
//! - ID prefix constants
//! - Validation error types surfaced by the constraint validator

pub mod entities;
pub mod enums;
pub mod errors;
pub mod grading;
pub mod ids;
