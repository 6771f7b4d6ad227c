//! Course repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist and re-assemble whole course aggregates (course, teacher,
//!   address, enrolled students).
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Course::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `delete_course` resolves the latest persisted row before mutating, so
//!   stale in-memory references are never acted on directly.

use crate::db::DbError;
use crate::model::course::{Address, Course, CourseId, CourseValidationError, Student, Teacher};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for course persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(CourseValidationError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted course data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<CourseValidationError> for RepoError {
    fn from(value: CourseValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for course aggregate operations.
pub trait CourseRepository {
    /// Inserts a whole aggregate; returns the stable course ID.
    fn create_course(&self, course: &Course) -> RepoResult<CourseId>;
    /// Re-assembles the latest persisted aggregate, `None` when gone.
    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>>;
    /// All courses in insertion order, students in enrollment order.
    fn list_courses(&self) -> RepoResult<Vec<Course>>;
    /// Deletes an aggregate with its owned sub-records.
    ///
    /// Returns `Ok(false)` when the course no longer exists.
    fn delete_course(&self, id: CourseId) -> RepoResult<bool>;
}

/// SQLite-backed course repository.
///
/// Borrows a connection (or a transaction, via deref) so the same code
/// path serves both direct reads and transactional writes.
pub struct SqliteCourseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCourseRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn insert_address(&self, address: &Address) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO addresses (uuid, full_name, street, house_number, city)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                address.uuid.to_string(),
                address.full_name.as_str(),
                address.street.as_str(),
                address.house_number,
                address.city.as_str(),
            ],
        )?;
        Ok(())
    }

    fn load_address(&self, uuid: &str) -> RepoResult<Option<Address>> {
        self.conn
            .query_row(
                "SELECT uuid, full_name, street, house_number, city
                 FROM addresses WHERE uuid = ?1;",
                [uuid],
                |row| {
                    Ok((
                        row.get::<_, String>("uuid")?,
                        row.get::<_, String>("full_name")?,
                        row.get::<_, String>("street")?,
                        row.get::<_, i64>("house_number")?,
                        row.get::<_, String>("city")?,
                    ))
                },
            )
            .optional()?
            .map(|(uuid_text, full_name, street, house_number, city)| {
                Ok(Address {
                    uuid: parse_uuid(&uuid_text, "addresses.uuid")?,
                    full_name,
                    street,
                    house_number,
                    city,
                })
            })
            .transpose()
    }

    fn load_teacher(&self, uuid: &str) -> RepoResult<Option<Teacher>> {
        let row = self
            .conn
            .query_row(
                "SELECT uuid, address_uuid FROM teachers WHERE uuid = ?1;",
                [uuid],
                |row| {
                    Ok((
                        row.get::<_, String>("uuid")?,
                        row.get::<_, Option<String>>("address_uuid")?,
                    ))
                },
            )
            .optional()?;

        let Some((uuid_text, address_uuid)) = row else {
            return Ok(None);
        };

        let address = match address_uuid {
            Some(address_uuid) => self.load_address(&address_uuid)?,
            None => None,
        };

        Ok(Some(Teacher {
            uuid: parse_uuid(&uuid_text, "teachers.uuid")?,
            address,
        }))
    }

    fn load_students(&self, course_uuid: &str) -> RepoResult<Vec<Student>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name FROM students
             WHERE course_uuid = ?1
             ORDER BY position ASC;",
        )?;

        let mut rows = stmt.query([course_uuid])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            students.push(Student {
                uuid: parse_uuid(&uuid_text, "students.uuid")?,
                name: row.get("name")?,
            });
        }
        Ok(students)
    }

    fn assemble_course(&self, row: &Row<'_>) -> RepoResult<Course> {
        let uuid_text: String = row.get("uuid")?;
        let teacher_uuid: Option<String> = row.get("teacher_uuid")?;
        let address_uuid: Option<String> = row.get("address_uuid")?;

        let teacher = match teacher_uuid {
            Some(teacher_uuid) => self.load_teacher(&teacher_uuid)?,
            None => None,
        };
        let address = match address_uuid {
            Some(address_uuid) => self.load_address(&address_uuid)?,
            None => None,
        };

        Ok(Course {
            uuid: parse_uuid(&uuid_text, "courses.uuid")?,
            name: row.get("name")?,
            teacher,
            address,
            enrolled_students: self.load_students(&uuid_text)?,
        })
    }
}

impl CourseRepository for SqliteCourseRepository<'_> {
    fn create_course(&self, course: &Course) -> RepoResult<CourseId> {
        course.validate()?;

        // One address record may be referenced by both the teacher and the
        // course; insert each distinct record once.
        let mut inserted_addresses: Vec<Uuid> = Vec::new();
        for address in course
            .teacher
            .as_ref()
            .and_then(|teacher| teacher.address.as_ref())
            .into_iter()
            .chain(course.address.as_ref())
        {
            if !inserted_addresses.contains(&address.uuid) {
                self.insert_address(address)?;
                inserted_addresses.push(address.uuid);
            }
        }

        if let Some(teacher) = &course.teacher {
            self.conn.execute(
                "INSERT INTO teachers (uuid, address_uuid) VALUES (?1, ?2);",
                params![
                    teacher.uuid.to_string(),
                    teacher.address.as_ref().map(|a| a.uuid.to_string()),
                ],
            )?;
        }

        self.conn.execute(
            "INSERT INTO courses (uuid, name, teacher_uuid, address_uuid)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                course.uuid.to_string(),
                course.name.as_str(),
                course.teacher.as_ref().map(|t| t.uuid.to_string()),
                course.address.as_ref().map(|a| a.uuid.to_string()),
            ],
        )?;

        for (position, student) in course.enrolled_students.iter().enumerate() {
            self.conn.execute(
                "INSERT INTO students (uuid, course_uuid, name, position)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    student.uuid.to_string(),
                    course.uuid.to_string(),
                    student.name.as_str(),
                    position as i64,
                ],
            )?;
        }

        Ok(course.uuid)
    }

    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, teacher_uuid, address_uuid
             FROM courses WHERE uuid = ?1;",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(self.assemble_course(row)?)),
            None => Ok(None),
        }
    }

    fn list_courses(&self) -> RepoResult<Vec<Course>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, teacher_uuid, address_uuid
             FROM courses
             ORDER BY created_at ASC, rowid ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut courses = Vec::new();
        while let Some(row) = rows.next()? {
            courses.push(self.assemble_course(row)?);
        }
        Ok(courses)
    }

    fn delete_course(&self, id: CourseId) -> RepoResult<bool> {
        // Resolve the latest persisted state first; a course already removed
        // by another path makes the whole delete a no-op.
        let Some(current) = self.get_course(id)? else {
            return Ok(false);
        };

        // Students cascade via FK. The course row must go first so the
        // teacher/address rows it references become unreferenced.
        self.conn.execute(
            "DELETE FROM courses WHERE uuid = ?1;",
            [id.to_string()],
        )?;

        if let Some(teacher) = &current.teacher {
            self.conn.execute(
                "DELETE FROM teachers WHERE uuid = ?1;",
                [teacher.uuid.to_string()],
            )?;
        }

        let mut deleted_addresses: Vec<Uuid> = Vec::new();
        for address in current
            .teacher
            .as_ref()
            .and_then(|teacher| teacher.address.as_ref())
            .into_iter()
            .chain(current.address.as_ref())
        {
            if !deleted_addresses.contains(&address.uuid) {
                self.conn.execute(
                    "DELETE FROM addresses WHERE uuid = ?1;",
                    [address.uuid.to_string()],
                )?;
                deleted_addresses.push(address.uuid);
            }
        }

        Ok(true)
    }
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}
