use coursebook_core::{
    Address, CourseRepository, CourseService, CourseStore, RepoError, SqliteCourseRepository,
    Student, Teacher,
};
use std::sync::Arc;

fn service() -> (Arc<CourseStore>, CourseService) {
    let store = Arc::new(CourseStore::open_in_memory().unwrap());
    let service = CourseService::new(store.clone());
    (store, service)
}

fn smith_teacher() -> Teacher {
    Teacher::with_address(Address::new("Smith", "Main", 5, "Springfield"))
}

#[test]
fn add_course_is_observable_and_dismisses_dialog() {
    let (_store, mut service) = service();
    let watcher = service.observe_courses();
    assert!(watcher.recv().unwrap().is_empty());

    service.show_add_dialog();
    let teacher = smith_teacher();
    service
        .add_course(
            "Math",
            Some(teacher.clone()),
            teacher.address.clone(),
            vec![Student::new("Alice"), Student::new("Bob")],
        )
        .unwrap();

    assert!(!service.is_add_dialog_visible());

    let snapshot = watcher.recv().unwrap();
    assert_eq!(snapshot.len(), 1);
    let course = &snapshot[0];
    assert_eq!(course.name, "Math");
    assert_eq!(
        course
            .teacher
            .as_ref()
            .and_then(|t| t.address.as_ref())
            .map(|a| a.full_name.as_str()),
        Some("Smith")
    );
    let students: Vec<&str> = course
        .enrolled_students
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(students, ["Alice", "Bob"]);
}

#[test]
fn blank_name_is_rejected_and_dialog_stays_open() {
    let (_store, mut service) = service();
    let watcher = service.observe_courses();
    let _ = watcher.recv().unwrap();

    service.show_add_dialog();
    let err = service
        .add_course("   ", None, None, Vec::new())
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    assert!(service.is_add_dialog_visible());
    assert!(watcher.try_recv().is_none());
    assert!(service.courses().is_empty());
}

#[test]
fn delete_without_selection_is_a_noop() {
    let (_store, mut service) = service();
    service
        .add_course("Math", None, None, Vec::new())
        .unwrap();

    assert!(!service.delete_course().unwrap());
    assert_eq!(service.courses().len(), 1);
}

#[test]
fn delete_selected_course_removes_it_and_clears_selection() {
    let (_store, mut service) = service();
    service
        .add_course("Math", None, None, Vec::new())
        .unwrap();

    let course = service.courses()[0].clone();
    service.select_course(course);
    assert!(service.selected_course().is_some());

    assert!(service.delete_course().unwrap());
    assert!(service.selected_course().is_none());
    assert!(service.courses().is_empty());
}

#[test]
fn delete_of_already_removed_selection_is_idempotent() {
    let (store, mut service) = service();
    service
        .add_course("Math", None, None, Vec::new())
        .unwrap();

    let course = service.courses()[0].clone();
    let id = course.uuid;
    service.select_course(course);

    // Another path removes the course while it is still selected.
    store
        .write(|tx| SqliteCourseRepository::new(tx).delete_course(id))
        .unwrap();

    assert!(!service.delete_course().unwrap());
    assert!(service.selected_course().is_none());
    assert!(service.courses().is_empty());
}

#[test]
fn add_select_delete_round_trips_to_previous_list() {
    let (_store, mut service) = service();
    service
        .add_course("Physics", None, None, Vec::new())
        .unwrap();
    let before = service.courses();

    let teacher = smith_teacher();
    service
        .add_course(
            "Math",
            Some(teacher.clone()),
            teacher.address.clone(),
            vec![Student::new("Alice")],
        )
        .unwrap();
    assert_eq!(service.courses().len(), 2);

    let added = service
        .courses()
        .iter()
        .find(|course| course.name == "Math")
        .cloned()
        .unwrap();
    service.select_course(added);
    assert!(service.delete_course().unwrap());

    assert_eq!(*service.courses(), *before);
}

#[test]
fn dialog_and_selection_state_are_independent() {
    let (_store, mut service) = service();
    service
        .add_course("Math", None, None, Vec::new())
        .unwrap();
    let course = service.courses()[0].clone();

    assert!(!service.is_add_dialog_visible());
    assert!(service.selected_course().is_none());

    service.show_add_dialog();
    service.select_course(course);
    assert!(service.is_add_dialog_visible());
    assert!(service.selected_course().is_some());

    service.hide_add_dialog();
    assert!(!service.is_add_dialog_visible());
    assert!(service.selected_course().is_some());

    service.clear_selection();
    assert!(service.selected_course().is_none());
}
