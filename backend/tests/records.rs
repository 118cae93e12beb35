use backend::course;
use backend::db::Db;
use backend::errors::BackendError;
use backend::record::{self, Price, RecordSubmission};
use backend::student;

mod common;

use common::{audio, create_course, create_student, environment, submission};

#[tokio::test]
async fn valid_submissions_create_records_with_zero_downloads() {
    let (environment, _db, store) = environment();
    let student = create_student(&environment).await;
    let course = create_course(&environment).await;

    let record = record::create(
        &environment,
        submission("Valid Record", &student, &course, 10.99),
        Some(audio("audio.mp3")),
    )
    .await
    .expect("create record");

    assert_eq!(record.downloads(), 0);
    assert_eq!(record.name(), "Valid Record");
    assert_eq!(record.owner_id(), student.account_id());
    assert_eq!(record.course_id(), course.id());
    assert!((record.price() - 10.99).abs() < f64::EPSILON);

    let stored = record::retrieve(&environment, record.id())
        .await
        .expect("retrieve record")
        .expect("record is persisted");
    assert_eq!(stored.downloads(), 0);

    let path = format!("user_{}/audio.mp3", student.account_id());
    assert_eq!(record.storage_path(), path);
    assert!(store.contains(&path), "audio payload is saved to the store");
}

#[tokio::test]
async fn a_price_of_zero_is_valid() {
    let (environment, _db, _store) = environment();
    let student = create_student(&environment).await;
    let course = create_course(&environment).await;

    let record = record::create(
        &environment,
        submission("Free Record", &student, &course, 0.0),
        Some(audio("audio.mp3")),
    )
    .await
    .expect("create free record");

    assert_eq!(record.price(), 0.0);
}

#[tokio::test]
async fn allowed_extensions_are_case_insensitive() {
    let (environment, _db, _store) = environment();
    let student = create_student(&environment).await;
    let course = create_course(&environment).await;

    for (index, filename) in ["audio.mp3", "audio.WAV", "AUDIO.Ogg"].iter().enumerate() {
        let name = format!("Record {}", index);

        record::create(
            &environment,
            submission(&name, &student, &course, 5.0),
            Some(audio(filename)),
        )
        .await
        .unwrap_or_else(|e| panic!("create record for {}: {}", filename, e));
    }
}

#[tokio::test]
async fn duplicate_name_and_owner_is_a_validation_error() {
    let (environment, _db, _store) = environment();
    let student = create_student(&environment).await;
    let course = create_course(&environment).await;
    let other_course = course::create(&environment, "Other-course")
        .await
        .expect("create other course");

    record::create(
        &environment,
        submission("Unique Record", &student, &course, 10.99),
        Some(audio("audio1.mp3")),
    )
    .await
    .expect("create first record");

    // a different course, file, and price make no difference
    let error = record::create(
        &environment,
        submission("Unique Record", &student, &other_course, 15.99),
        Some(audio("audio2.wav")),
    )
    .await
    .expect_err("duplicate (name, owner) must be rejected");

    assert!(matches!(error, BackendError::NameAlreadyExists));
    assert!(error.is_validation());
    assert_eq!(
        error.to_string(),
        "A record with the same name and owner already exists."
    );
}

#[tokio::test]
async fn the_same_name_under_another_owner_is_allowed() {
    let (environment, _db, _store) = environment();
    let student = create_student(&environment).await;
    let other = student::create(&environment, "other-user", "password", "1991-01-01")
        .await
        .expect("create second student");
    let course = create_course(&environment).await;

    record::create(
        &environment,
        submission("Shared Name", &student, &course, 10.0),
        Some(audio("audio1.mp3")),
    )
    .await
    .expect("create first record");

    record::create(
        &environment,
        submission("Shared Name", &other, &course, 10.0),
        Some(audio("audio2.mp3")),
    )
    .await
    .expect("same name under another owner");
}

#[tokio::test]
async fn negative_prices_are_rejected() {
    let (environment, _db, _store) = environment();
    let student = create_student(&environment).await;
    let course = create_course(&environment).await;

    let error = record::create(
        &environment,
        submission("Negative Price", &student, &course, -5.99),
        Some(audio("audio.mp3")),
    )
    .await
    .expect_err("negative price must be rejected");

    assert!(matches!(error, BackendError::InvalidPrice));
    assert_eq!(error.to_string(), "Price must be a valid float or integer.");
}

#[tokio::test]
async fn non_numeric_prices_are_rejected() {
    let (environment, _db, _store) = environment();
    let student = create_student(&environment).await;
    let course = create_course(&environment).await;

    let submission = RecordSubmission {
        price: Some(Price::Other(serde_json::json!("invalid_price"))),
        ..submission("Invalid Price Record", &student, &course, 0.0)
    };

    let error = record::create(&environment, submission, Some(audio("audio.mp3")))
        .await
        .expect_err("non-numeric price must be rejected");

    assert!(matches!(error, BackendError::InvalidPrice));
}

#[tokio::test]
async fn disallowed_extensions_are_rejected() {
    let (environment, _db, _store) = environment();
    let student = create_student(&environment).await;
    let course = create_course(&environment).await;

    let error = record::create(
        &environment,
        submission("Invalid Format Record", &student, &course, 5.99),
        Some(audio("invalid.txt")),
    )
    .await
    .expect_err("disallowed extension must be rejected");

    assert!(matches!(error, BackendError::InvalidAudioFormat));
    assert_eq!(
        error.to_string(),
        "Invalid audio file format. Supported formats: .mp3, .wav, .ogg"
    );
}

#[tokio::test]
async fn missing_fields_are_rejected_before_anything_else() {
    let (environment, _db, store) = environment();
    let student = create_student(&environment).await;
    let course = create_course(&environment).await;

    let missing_name = RecordSubmission {
        name: None,
        ..submission("", &student, &course, 12.99)
    };
    let error = record::create(&environment, missing_name, Some(audio("audio.mp3")))
        .await
        .expect_err("missing name must be rejected");
    assert!(matches!(error, BackendError::PartsMissing));
    assert_eq!(
        error.to_string(),
        "All fields (name, owner, course, record, price) must be provided."
    );

    let blank_name = submission("   ", &student, &course, 12.99);
    let error = record::create(&environment, blank_name, Some(audio("audio.mp3")))
        .await
        .expect_err("blank name must be rejected");
    assert!(matches!(error, BackendError::PartsMissing));

    // the missing file short-circuits before the price and extension checks
    let bad_price_too = submission("Missing Record", &student, &course, -9.99);
    let error = record::create(&environment, bad_price_too, None)
        .await
        .expect_err("missing file must be rejected");
    assert!(matches!(error, BackendError::PartsMissing));

    assert!(store.is_empty(), "nothing may be written for rejected submissions");
}

#[tokio::test]
async fn the_uniqueness_check_runs_before_the_price_check() {
    let (environment, _db, _store) = environment();
    let student = create_student(&environment).await;
    let course = create_course(&environment).await;

    record::create(
        &environment,
        submission("Ordered Checks", &student, &course, 1.0),
        Some(audio("audio.mp3")),
    )
    .await
    .expect("create first record");

    let error = record::create(
        &environment,
        submission("Ordered Checks", &student, &course, -1.0),
        Some(audio("audio.wav")),
    )
    .await
    .expect_err("duplicate must be reported before the bad price");

    assert!(matches!(error, BackendError::NameAlreadyExists));
}

#[tokio::test]
async fn deleting_a_course_deletes_its_records() {
    let (environment, _db, _store) = environment();
    let student = create_student(&environment).await;
    let course = create_course(&environment).await;

    let record = record::create(
        &environment,
        submission("Course Record", &student, &course, 3.0),
        Some(audio("audio.mp3")),
    )
    .await
    .expect("create record");

    course::delete(&environment, course.id())
        .await
        .expect("delete course");

    assert!(course::retrieve(&environment, course.id())
        .await
        .expect("retrieve course")
        .is_none());
    assert!(record::retrieve(&environment, record.id())
        .await
        .expect("retrieve record")
        .is_none());
}

#[tokio::test]
async fn deleting_the_owning_account_deletes_records() {
    let (environment, db, _store) = environment();
    let student = create_student(&environment).await;
    let course = create_course(&environment).await;

    let record = record::create(
        &environment,
        submission("Owned Record", &student, &course, 3.0),
        Some(audio("audio.mp3")),
    )
    .await
    .expect("create record");

    student::delete_account(&environment, student.account_id())
        .await
        .expect("delete account");

    assert!(record::retrieve(&environment, record.id())
        .await
        .expect("retrieve record")
        .is_none());
    assert!(db
        .records_by_owner(student.account_id())
        .await
        .expect("list records")
        .is_empty());
}

#[tokio::test]
async fn deleting_a_record_removes_its_file() {
    let (environment, _db, store) = environment();
    let student = create_student(&environment).await;
    let course = create_course(&environment).await;

    let record = record::create(
        &environment,
        submission("Doomed Record", &student, &course, 3.0),
        Some(audio("audio.mp3")),
    )
    .await
    .expect("create record");

    let path = record.storage_path();
    assert!(store.contains(&path));

    record::delete(&environment, record.id())
        .await
        .expect("delete record");

    assert!(!store.contains(&path));
    assert!(record::retrieve(&environment, record.id())
        .await
        .expect("retrieve record")
        .is_none());
}
