use coursebook_core::db::open_db_in_memory;
use coursebook_core::{
    Address, Course, CourseRepository, RepoError, SqliteCourseRepository, Student, Teacher,
};
use rusqlite::Connection;
use uuid::Uuid;

fn math_course() -> Course {
    let address = Address::new("Smith", "Main", 5, "Springfield");
    let teacher = Teacher::with_address(address.clone());
    let mut course = Course::new("Math");
    course.address = teacher.address.clone();
    course.teacher = Some(teacher);
    course.enrolled_students = vec![Student::new("Alice"), Student::new("Bob")];
    course
}

#[test]
fn create_and_get_roundtrip_full_aggregate() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::new(&conn);

    let course = math_course();
    let id = repo.create_course(&course).unwrap();

    let loaded = repo.get_course(id).unwrap().unwrap();
    assert_eq!(loaded.uuid, course.uuid);
    assert_eq!(loaded.name, "Math");

    let teacher = loaded.teacher.as_ref().unwrap();
    let address = teacher.address.as_ref().unwrap();
    assert_eq!(address.full_name, "Smith");
    assert_eq!(address.street, "Main");
    assert_eq!(address.house_number, 5);
    assert_eq!(address.city, "Springfield");

    // Redundant course-level reference resolves to the same record.
    assert_eq!(loaded.address, teacher.address);

    let student_names: Vec<&str> = loaded
        .enrolled_students
        .iter()
        .map(|student| student.name.as_str())
        .collect();
    assert_eq!(student_names, ["Alice", "Bob"]);
}

#[test]
fn create_rejects_blank_name_without_persisting() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::new(&conn);

    let err = repo.create_course(&Course::new("   ")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    assert_eq!(table_count(&conn, "courses"), 0);
    assert_eq!(table_count(&conn, "addresses"), 0);
}

#[test]
fn shared_address_is_stored_once() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::new(&conn);

    repo.create_course(&math_course()).unwrap();

    // teacher.address and course.address point at one record.
    assert_eq!(table_count(&conn, "addresses"), 1);
}

#[test]
fn course_without_teacher_or_students_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::new(&conn);

    let course = Course::new("Self study");
    let id = repo.create_course(&course).unwrap();

    let loaded = repo.get_course(id).unwrap().unwrap();
    assert!(loaded.teacher.is_none());
    assert!(loaded.address.is_none());
    assert!(loaded.enrolled_students.is_empty());
}

#[test]
fn list_preserves_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::new(&conn);

    repo.create_course(&Course::new("Math")).unwrap();
    repo.create_course(&Course::new("Physics")).unwrap();
    repo.create_course(&Course::new("Chemistry")).unwrap();

    let names: Vec<String> = repo
        .list_courses()
        .unwrap()
        .into_iter()
        .map(|course| course.name)
        .collect();
    assert_eq!(names, ["Math", "Physics", "Chemistry"]);
}

#[test]
fn delete_removes_all_owned_records() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::new(&conn);

    let id = repo.create_course(&math_course()).unwrap();
    assert!(repo.delete_course(id).unwrap());

    assert!(repo.get_course(id).unwrap().is_none());
    assert_eq!(table_count(&conn, "courses"), 0);
    assert_eq!(table_count(&conn, "teachers"), 0);
    assert_eq!(table_count(&conn, "addresses"), 0);
    assert_eq!(table_count(&conn, "students"), 0);
}

#[test]
fn delete_leaves_other_courses_untouched() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::new(&conn);

    let keep = repo.create_course(&math_course()).unwrap();
    let drop_id = repo.create_course(&Course::new("Physics")).unwrap();

    assert!(repo.delete_course(drop_id).unwrap());

    let remaining = repo.list_courses().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].uuid, keep);
    assert_eq!(remaining[0].enrolled_students.len(), 2);
}

#[test]
fn delete_of_missing_course_is_a_noop() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCourseRepository::new(&conn);

    assert!(!repo.delete_course(Uuid::new_v4()).unwrap());

    let id = repo.create_course(&Course::new("Math")).unwrap();
    assert!(repo.delete_course(id).unwrap());
    assert!(!repo.delete_course(id).unwrap());
}

fn table_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
