//! Domain model for the course catalog.
//!
//! # Responsibility
//! - Define the four persisted record kinds and their ownership shape.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - A course aggregate is created and deleted as a whole.

pub mod course;
