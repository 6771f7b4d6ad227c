//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `coursebook_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use coursebook_core::{Address, CourseService, CourseStore, Student, Teacher};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    println!("coursebook_core ping={}", coursebook_core::ping());
    println!("coursebook_core version={}", coursebook_core::core_version());

    // In-memory round-trip to validate store, repository and controller
    // wiring independently from the Flutter/FFI runtime.
    match smoke_round_trip() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("coursebook_core smoke failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn smoke_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(CourseStore::open_in_memory()?);
    let mut service = CourseService::new(store);

    let teacher = Teacher::with_address(Address::new("Smith", "Main", 5, "Springfield"));
    let address = teacher.address.clone();
    service.add_course(
        "Math",
        Some(teacher),
        address,
        vec![Student::new("Alice"), Student::new("Bob")],
    )?;

    for course in service.courses().iter() {
        println!(
            "course name={} students={}",
            course.name,
            course.enrolled_students.len()
        );
    }

    Ok(())
}
