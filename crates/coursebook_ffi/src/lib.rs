//! Flutter-facing FFI crate for the Coursebook core.
//!
//! All exported functions live in [`api`]; this crate adds no business
//! logic of its own.

pub mod api;
