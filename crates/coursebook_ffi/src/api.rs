//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Own the process-wide store handle and controller on behalf of the
//!   UI shell; core itself takes the store by injection.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Fallible calls return an empty string on success and a human-readable
//!   error message on failure.

use coursebook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Address, Course, CourseService, CourseStore, Student, Teacher,
};
use log::info;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use uuid::Uuid;

const STORE_DB_FILE_NAME: &str = "coursebook.sqlite3";

static SERVICE: OnceLock<Mutex<CourseService>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return an
///   error message.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Opens the process-wide course store inside `db_dir`.
///
/// Called once at app start, before any other catalog call. Repeated calls
/// are accepted and leave the already-open store untouched.
///
/// # FFI contract
/// - Sync call; performs file-system and schema-migration work.
/// - Returns an error message when the directory or database cannot be
///   prepared.
#[flutter_rust_bridge::frb(sync)]
pub fn init_store(db_dir: String) -> String {
    if SERVICE.get().is_some() {
        return String::new();
    }

    let dir = PathBuf::from(db_dir);
    if let Err(err) = std::fs::create_dir_all(&dir) {
        return format!("failed to create store directory `{}`: {err}", dir.display());
    }

    let store = match CourseStore::open(dir.join(STORE_DB_FILE_NAME)) {
        Ok(store) => Arc::new(store),
        Err(err) => return format!("failed to open course store: {err}"),
    };

    info!(
        "event=store_init module=ffi status=ok dir={}",
        dir.display()
    );
    let _ = SERVICE.set(Mutex::new(CourseService::new(store)));
    String::new()
}

/// Course row as rendered in the catalog list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseListItem {
    /// Stable course ID in string form; pass back to `select_course`.
    pub id: String,
    pub name: String,
    /// Teacher's full name, taken from the teacher's address record.
    pub teacher_name: Option<String>,
    /// Enrolled student names in enrollment order.
    pub student_names: Vec<String>,
}

/// Detail projection for the selected-course dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDetails {
    pub id: String,
    pub name: String,
    pub teacher_full_name: Option<String>,
    /// `street house_number` as one display line.
    pub street_line: Option<String>,
    pub city: Option<String>,
}

/// Input for creating a course from the add dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddCourseRequest {
    pub name: String,
    pub teacher_name: String,
    pub street: String,
    pub house_number: i64,
    pub city: String,
    /// Student names in enrollment order.
    pub students: Vec<String>,
}

/// Returns the last committed course list.
///
/// # FFI contract
/// - Sync call, reads the in-memory snapshot; no database work.
/// - Empty vector before `init_store` succeeded.
#[flutter_rust_bridge::frb(sync)]
pub fn list_courses() -> Vec<CourseListItem> {
    match SERVICE.get() {
        Some(service) => lock_unpoisoned(service)
            .courses()
            .iter()
            .map(course_list_item)
            .collect(),
        None => Vec::new(),
    }
}

/// Creates a course aggregate from add-dialog input.
///
/// A blank course name is rejected without touching the database and the
/// add dialog stays visible; on success the dialog flag is cleared.
#[flutter_rust_bridge::frb(sync)]
pub fn add_course(request: AddCourseRequest) -> String {
    let Some(service) = SERVICE.get() else {
        return "store is not initialized; call init_store first".to_string();
    };

    let teacher = Teacher::with_address(Address::new(
        request.teacher_name,
        request.street,
        request.house_number,
        request.city,
    ));
    let students = request
        .students
        .into_iter()
        .map(Student::new)
        .collect::<Vec<_>>();

    let mut service = lock_unpoisoned(service);
    let address = teacher.address.clone();
    match service.add_course(request.name, Some(teacher), address, students) {
        Ok(_) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Marks the course with the given ID as currently inspected.
#[flutter_rust_bridge::frb(sync)]
pub fn select_course(course_id: String) -> String {
    let Some(service) = SERVICE.get() else {
        return "store is not initialized; call init_store first".to_string();
    };
    let Ok(id) = Uuid::parse_str(&course_id) else {
        return format!("invalid course id `{course_id}`");
    };

    let mut service = lock_unpoisoned(service);
    let course = service
        .courses()
        .iter()
        .find(|course| course.uuid == id)
        .cloned();
    match course {
        Some(course) => {
            service.select_course(course);
            String::new()
        }
        None => format!("course `{course_id}` not found"),
    }
}

/// Clears the inspected-course pointer.
#[flutter_rust_bridge::frb(sync)]
pub fn clear_selection() {
    if let Some(service) = SERVICE.get() {
        lock_unpoisoned(service).clear_selection();
    }
}

/// Detail projection of the currently inspected course, if any.
#[flutter_rust_bridge::frb(sync)]
pub fn selected_course() -> Option<CourseDetails> {
    let service = SERVICE.get()?;
    let service = lock_unpoisoned(service);
    service.selected_course().map(course_details)
}

/// Deletes the currently inspected course.
///
/// No selection or an already-removed course is a benign no-op; only
/// storage failures produce an error message (and leave the selection
/// set, so the UI state does not lie about success).
#[flutter_rust_bridge::frb(sync)]
pub fn delete_selected_course() -> String {
    let Some(service) = SERVICE.get() else {
        return "store is not initialized; call init_store first".to_string();
    };

    match lock_unpoisoned(service).delete_course() {
        Ok(_) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Shows the add-course dialog flag.
#[flutter_rust_bridge::frb(sync)]
pub fn show_add_dialog() {
    if let Some(service) = SERVICE.get() {
        lock_unpoisoned(service).show_add_dialog();
    }
}

/// Hides the add-course dialog flag.
#[flutter_rust_bridge::frb(sync)]
pub fn hide_add_dialog() {
    if let Some(service) = SERVICE.get() {
        lock_unpoisoned(service).hide_add_dialog();
    }
}

/// Current add-dialog visibility; `false` before `init_store`.
#[flutter_rust_bridge::frb(sync)]
pub fn is_add_dialog_visible() -> bool {
    SERVICE
        .get()
        .map(|service| lock_unpoisoned(service).is_add_dialog_visible())
        .unwrap_or(false)
}

fn course_list_item(course: &Course) -> CourseListItem {
    CourseListItem {
        id: course.uuid.to_string(),
        name: course.name.clone(),
        teacher_name: course
            .teacher
            .as_ref()
            .and_then(|teacher| teacher.address.as_ref())
            .map(|address| address.full_name.clone()),
        student_names: course
            .enrolled_students
            .iter()
            .map(|student| student.name.clone())
            .collect(),
    }
}

fn course_details(course: &Course) -> CourseDetails {
    let address = course
        .teacher
        .as_ref()
        .and_then(|teacher| teacher.address.as_ref());
    CourseDetails {
        id: course.uuid.to_string(),
        name: course.name.clone(),
        teacher_full_name: address.map(|a| a.full_name.clone()),
        street_line: address.map(|a| format!("{} {}", a.street, a.house_number)),
        city: address.map(|a| a.city.clone()),
    }
}

// Never panic across the boundary: a poisoned lock means a previous call
// panicked, but the guarded controller state is still usable.
fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
