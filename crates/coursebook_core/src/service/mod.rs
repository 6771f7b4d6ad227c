//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store and repository calls into UI-facing operations.
//! - Own transient view state that is never persisted.

pub mod course_service;
