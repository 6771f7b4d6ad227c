//! Course use-case controller.
//!
//! # Responsibility
//! - Mediate between the store and the presentation layer: expose the
//!   observable course list and the add/delete operations.
//! - Own UI-facing transient state (add-dialog visibility, current
//!   selection); never render anything.
//!
//! # Invariants
//! - A blank course name is rejected before any transaction is opened.
//! - The add-dialog flag is cleared only after a successful commit; a
//!   failed write leaves the dialog open.
//! - The selection is cleared whenever the delete transaction completes,
//!   whether or not the course still existed; a storage failure leaves
//!   the selection set.

use crate::model::course::{Address, Course, CourseId, Student, Teacher};
use crate::repo::course_repo::{CourseRepository, RepoResult, SqliteCourseRepository};
use crate::store::{CourseSnapshot, CourseStore, CourseWatcher};
use log::{info, warn};
use std::sync::Arc;

/// Controller binding the reactive course list to the store.
///
/// View-state fields live here, not in the database: `dialog` and
/// `selection` are independent, both start empty, and each resets after
/// its completing action.
pub struct CourseService {
    store: Arc<CourseStore>,
    selected: Option<Course>,
    add_dialog_visible: bool,
}

impl CourseService {
    /// Creates a controller over an injected store handle.
    pub fn new(store: Arc<CourseStore>) -> Self {
        Self {
            store,
            selected: None,
            add_dialog_visible: false,
        }
    }

    /// Subscribes to the live course list.
    ///
    /// The watcher's first delivery reflects the state at subscription
    /// time; afterwards one snapshot per result-changing commit.
    pub fn observe_courses(&self) -> CourseWatcher {
        self.store.observe()
    }

    /// Returns the last committed course list without subscribing.
    pub fn courses(&self) -> CourseSnapshot {
        self.store.latest_snapshot()
    }

    /// Creates and persists a course aggregate in one write transaction.
    ///
    /// # Errors
    /// - `RepoError::Validation` for a blank name; no transaction is
    ///   opened in that case and the add dialog stays visible.
    /// - Storage errors roll the transaction back; nothing is persisted
    ///   and the add dialog stays visible.
    pub fn add_course(
        &mut self,
        name: impl Into<String>,
        teacher: Option<Teacher>,
        address: Option<Address>,
        students: Vec<Student>,
    ) -> RepoResult<CourseId> {
        let mut course = Course::new(name);
        course.teacher = teacher;
        course.address = address;
        course.enrolled_students = students;

        // Reject before touching the store; the repository re-checks
        // inside the transaction.
        course.validate()?;

        let id = self
            .store
            .write(|tx| SqliteCourseRepository::new(tx).create_course(&course))?;

        self.add_dialog_visible = false;
        info!("event=course_added module=service status=ok course_id={id}");
        Ok(id)
    }

    /// Deletes the currently selected course, if any.
    ///
    /// Resolves the selection to its latest persisted identity inside the
    /// write transaction; a course already removed by another path makes
    /// this a no-op (`Ok(false)`). With no selection, no transaction is
    /// opened at all.
    pub fn delete_course(&mut self) -> RepoResult<bool> {
        let Some(course) = self.selected.as_ref() else {
            return Ok(false);
        };
        let id = course.uuid;

        let deleted = self
            .store
            .write(|tx| SqliteCourseRepository::new(tx).delete_course(id))?;

        // The transaction completed; the selection is stale either way.
        self.selected = None;
        if deleted {
            info!("event=course_deleted module=service status=ok course_id={id}");
        } else {
            warn!("event=course_deleted module=service status=noop course_id={id}");
        }
        Ok(deleted)
    }

    /// Marks a course as the one currently inspected. Pure view state.
    pub fn select_course(&mut self, course: Course) {
        self.selected = Some(course);
    }

    /// Clears the inspected-course pointer. Pure view state.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Currently inspected course, if any.
    pub fn selected_course(&self) -> Option<&Course> {
        self.selected.as_ref()
    }

    /// Shows the add-course dialog. Pure view state.
    pub fn show_add_dialog(&mut self) {
        self.add_dialog_visible = true;
    }

    /// Hides the add-course dialog. Pure view state.
    pub fn hide_add_dialog(&mut self) {
        self.add_dialog_visible = false;
    }

    pub fn is_add_dialog_visible(&self) -> bool {
        self.add_dialog_visible
    }
}
