#![allow(dead_code)]

use std::sync::Arc;

use backend::course::{self, Course};
use backend::db::memory::MemoryDb;
use backend::environment::Environment;
use backend::record::{Price, RecordSubmission};
use backend::store::mock::MockStore;
use backend::store::Upload;
use backend::student::{self, Student};

/// Wires an environment against the in-memory backends, returning
/// handles for direct inspection.
pub fn environment() -> (Environment<()>, Arc<MemoryDb>, Arc<MockStore>) {
    let db = Arc::new(MemoryDb::new());
    let store = Arc::new(MockStore::new());
    let environment = Environment::new(Arc::new(log::discard_logger()), db.clone(), store.clone());

    (environment, db, store)
}

pub async fn create_student(environment: &Environment<()>) -> Student {
    student::create(environment, "test-user", "password", "1990-01-01")
        .await
        .expect("create student")
}

pub async fn create_course(environment: &Environment<()>) -> Course {
    course::create(environment, "Test-course")
        .await
        .expect("create course")
}

pub fn audio(filename: &str) -> Upload {
    Upload::new(filename, b"file_content".to_vec())
}

pub fn picture(filename: &str) -> Upload {
    Upload::new(filename, b"dummy_image_data".to_vec())
}

pub fn submission(
    name: &str,
    student: &Student,
    course: &Course,
    price: f64,
) -> RecordSubmission {
    RecordSubmission {
        name: Some(name.to_owned()),
        owner_id: Some(*student.account_id()),
        course_id: Some(course.id()),
        price: Some(Price::Amount(price)),
    }
}
