//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for course aggregates.
//! - Isolate SQLite query details from store/controller orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Course::validate()` before persistence.
//! - Deleting a record that no longer exists is a benign no-op, not an
//!   error.

pub mod course_repo;
