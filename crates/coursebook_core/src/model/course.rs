//! Course aggregate and its owned record kinds.
//!
//! # Responsibility
//! - Define the canonical shapes for Address, Teacher, Student and Course.
//! - Provide aggregate construction and validation helpers.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another record.
//! - `Course::name` must not be blank when the aggregate is persisted.
//! - `Course::address` mirrors `Teacher::address` when both are set; the
//!   duplication is part of the persisted shape, not an accident of this
//!   module (see DESIGN.md).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a persisted course.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type CourseId = Uuid;

/// Postal address owned by exactly one teacher.
///
/// An address can exist transiently unattached while an aggregate is being
/// assembled, but once persisted it always belongs to a teacher (and,
/// redundantly, to that teacher's course).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Stable global ID.
    pub uuid: Uuid,
    /// Full name of the person reachable at this address.
    pub full_name: String,
    pub street: String,
    pub house_number: i64,
    pub city: String,
}

impl Address {
    /// Creates an address with a generated stable ID.
    pub fn new(
        full_name: impl Into<String>,
        street: impl Into<String>,
        house_number: i64,
        city: impl Into<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            full_name: full_name.into(),
            street: street.into(),
            house_number,
            city: city.into(),
        }
    }
}

/// Teacher record. Exclusively owns its optional address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    /// Stable global ID.
    pub uuid: Uuid,
    /// Owned sub-record; deleted together with the teacher.
    pub address: Option<Address>,
}

impl Teacher {
    /// Creates a teacher with a generated stable ID and no address.
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            address: None,
        }
    }

    /// Creates a teacher who owns the given address.
    pub fn with_address(address: Address) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            address: Some(address),
        }
    }
}

impl Default for Teacher {
    fn default() -> Self {
        Self::new()
    }
}

/// Student record, owned by the course that enrolls it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Stable global ID.
    pub uuid: Uuid,
    pub name: String,
}

impl Student {
    /// Creates a student with a generated stable ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Course aggregate root.
///
/// Both `teacher` and `address` are optional references; when both are set
/// they typically point at the same address record (the persisted shape
/// stores the reference twice).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Stable global ID used for re-resolving the latest persisted state.
    pub uuid: CourseId,
    /// Display name; must be non-blank.
    pub name: String,
    pub teacher: Option<Teacher>,
    /// Redundant copy of the teacher's address reference.
    pub address: Option<Address>,
    /// Enrollment order is preserved across persistence.
    pub enrolled_students: Vec<Student>,
}

impl Course {
    /// Creates an empty course with a generated stable ID.
    ///
    /// # Invariants
    /// - Optional references start as `None`, the student list empty.
    /// - The name is not validated here; call [`Course::validate`] before
    ///   persisting.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates a course with a caller-provided stable ID.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(uuid: CourseId, name: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
            teacher: None,
            address: None,
            enrolled_students: Vec::new(),
        }
    }

    /// Validates the aggregate against persistence invariants.
    ///
    /// # Errors
    /// - [`CourseValidationError::BlankName`] when the name is empty or
    ///   whitespace-only.
    pub fn validate(&self) -> Result<(), CourseValidationError> {
        if self.name.trim().is_empty() {
            return Err(CourseValidationError::BlankName);
        }
        Ok(())
    }
}

/// Validation failure raised before any write is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseValidationError {
    /// Course name is empty or whitespace-only.
    BlankName,
}

impl Display for CourseValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "course name must not be blank"),
        }
    }
}

impl Error for CourseValidationError {}

#[cfg(test)]
mod tests {
    use super::{Address, Course, CourseValidationError, Student, Teacher};

    #[test]
    fn new_course_starts_empty() {
        let course = Course::new("Math");
        assert_eq!(course.name, "Math");
        assert!(course.teacher.is_none());
        assert!(course.address.is_none());
        assert!(course.enrolled_students.is_empty());
    }

    #[test]
    fn validate_rejects_blank_names() {
        assert_eq!(
            Course::new("").validate(),
            Err(CourseValidationError::BlankName)
        );
        assert_eq!(
            Course::new("   ").validate(),
            Err(CourseValidationError::BlankName)
        );
        assert_eq!(Course::new("Physics").validate(), Ok(()));
    }

    #[test]
    fn teacher_owns_its_address() {
        let address = Address::new("Smith", "Main", 5, "Springfield");
        let address_id = address.uuid;
        let teacher = Teacher::with_address(address);
        assert_eq!(
            teacher.address.as_ref().map(|a| a.uuid),
            Some(address_id)
        );
    }

    #[test]
    fn students_keep_distinct_identity_for_equal_names() {
        let first = Student::new("Alice");
        let second = Student::new("Alice");
        assert_ne!(first.uuid, second.uuid);
        assert_eq!(first.name, second.name);
    }
}
