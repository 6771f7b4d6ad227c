use coursebook_core::{Address, Course, Student, Teacher};

#[test]
fn course_aggregate_serializes_to_json_and_back() {
    let teacher = Teacher::with_address(Address::new("Smith", "Main", 5, "Springfield"));
    let mut course = Course::new("Math");
    course.address = teacher.address.clone();
    course.teacher = Some(teacher);
    course.enrolled_students = vec![Student::new("Alice"), Student::new("Bob")];

    let json = serde_json::to_string(&course).unwrap();
    let decoded: Course = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, course);
}

#[test]
fn json_field_names_are_stable() {
    let course = Course::new("Math");
    let json = serde_json::to_value(&course).unwrap();

    assert!(json.get("uuid").is_some());
    assert!(json.get("name").is_some());
    assert!(json.get("teacher").is_some());
    assert!(json.get("address").is_some());
    assert!(json.get("enrolled_students").is_some());
}

#[test]
fn optional_references_serialize_as_null() {
    let course = Course::new("Math");
    let json = serde_json::to_value(&course).unwrap();

    assert!(json["teacher"].is_null());
    assert!(json["address"].is_null());
}
