use futures::future::BoxFuture;
use uuid::Uuid;

use crate::course::{Course, Id};
use crate::errors::BackendError;
use crate::record::{NewRecord, Record};
use crate::student::{Account, Student};

pub mod memory;

/// The repository interface every operation runs against.
///
/// Uniqueness and referential rules live here: implementations raise
/// the integrity variants of [`BackendError`] when a constraint is
/// violated, and deletion propagates explicitly (account → student →
/// records, course → records).
pub trait Db {
    fn create_account(
        &self,
        username: &str,
        password: &str,
    ) -> BoxFuture<Result<Account, BackendError>>;

    fn retrieve_account(&self, id: &Uuid) -> BoxFuture<Result<Option<Account>, BackendError>>;

    /// Deletes an account, its student, and the student's records.
    fn delete_account(&self, id: &Uuid) -> BoxFuture<Result<(), BackendError>>;

    fn create_course(&self, name: String) -> BoxFuture<Result<Course, BackendError>>;

    fn retrieve_course(&self, id: Id) -> BoxFuture<Result<Option<Course>, BackendError>>;

    /// Deletes a course and its records.
    fn delete_course(&self, id: Id) -> BoxFuture<Result<(), BackendError>>;

    fn insert_student(
        &self,
        account_id: &Uuid,
        birth_date: &str,
    ) -> BoxFuture<Result<Student, BackendError>>;

    fn retrieve_student(
        &self,
        account_id: &Uuid,
    ) -> BoxFuture<Result<Option<Student>, BackendError>>;

    fn update_student(&self, student: &Student) -> BoxFuture<Result<(), BackendError>>;

    /// Deletes a student and its records.
    fn delete_student(&self, account_id: &Uuid) -> BoxFuture<Result<(), BackendError>>;

    /// Whether a record with this (name, owner) pair already exists.
    fn record_exists(&self, name: &str, owner_id: &Uuid) -> BoxFuture<Result<bool, BackendError>>;

    /// Inserts a validated record with its download counter at zero.
    fn insert_record(&self, record: NewRecord) -> BoxFuture<Result<Record, BackendError>>;

    fn retrieve_record(&self, id: &Uuid) -> BoxFuture<Result<Option<Record>, BackendError>>;

    fn records_by_owner(&self, owner_id: &Uuid) -> BoxFuture<Result<Vec<Record>, BackendError>>;

    fn delete_record(&self, id: &Uuid) -> BoxFuture<Result<(), BackendError>>;
}

pub use self::postgres::*;

mod postgres {
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use sqlx::{self, postgres::PgPool};
    use uuid::Uuid;

    use crate::course::{Course, Id};
    use crate::errors::BackendError;
    use crate::record::{NewRecord, Record};
    use crate::student::{Account, Student, DEFAULT_PROFILE_PIC};

    const ACCOUNTS_USERNAME_CONSTRAINT: &str = "accounts_username";
    const COURSES_NAME_CONSTRAINT: &str = "courses_name";
    const RECORDS_NAME_OWNER_CONSTRAINT: &str = "records_name_owner";
    const RECORDS_OWNER_CONSTRAINT: &str = "records_owner_fkey";
    const RECORDS_COURSE_CONSTRAINT: &str = "records_course_fkey";
    const STUDENTS_ACCOUNT_CONSTRAINT: &str = "students_account_fkey";

    pub struct PgDb {
        pool: PgPool,
    }

    impl PgDb {
        pub fn new(pool: PgPool) -> Self {
            PgDb { pool }
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Db for PgDb {
        fn create_account(
            &self,
            username: &str,
            password: &str,
        ) -> BoxFuture<Result<Account, BackendError>> {
            let username = username.to_owned();
            let password = password.to_owned();

            async move {
                let id = Uuid::new_v4();
                let query = sqlx::query(include_str!("queries/create_account.sql"));

                query
                    .bind(id)
                    .bind(&username)
                    .bind(&password)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(Account::new(id, username, password))
            }
            .boxed()
        }

        fn retrieve_account(&self, id: &Uuid) -> BoxFuture<Result<Option<Account>, BackendError>> {
            let id = *id;

            async move {
                let query =
                    sqlx::query_as::<_, Account>(include_str!("queries/retrieve_account.sql"));

                let account = query
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(account)
            }
            .boxed()
        }

        fn delete_account(&self, id: &Uuid) -> BoxFuture<Result<(), BackendError>> {
            let id = *id;

            async move {
                let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

                sqlx::query(include_str!("queries/delete_records_by_owner.sql"))
                    .bind(id)
                    .execute(&mut tx)
                    .await
                    .map_err(map_sqlx_error)?;

                sqlx::query(include_str!("queries/delete_student.sql"))
                    .bind(id)
                    .execute(&mut tx)
                    .await
                    .map_err(map_sqlx_error)?;

                let count = sqlx::query(include_str!("queries/delete_account.sql"))
                    .bind(id)
                    .execute(&mut tx)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if count == 0 {
                    return Err(BackendError::NonExistentId(id));
                }

                tx.commit().await.map_err(map_sqlx_error)?;

                Ok(())
            }
            .boxed()
        }

        fn create_course(&self, name: String) -> BoxFuture<Result<Course, BackendError>> {
            async move {
                let query = sqlx::query_as(include_str!("queries/create_course.sql"));

                let (id,): (Id,) = query
                    .bind(&name)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(Course::new(id, name))
            }
            .boxed()
        }

        fn retrieve_course(&self, id: Id) -> BoxFuture<Result<Option<Course>, BackendError>> {
            async move {
                let query =
                    sqlx::query_as::<_, Course>(include_str!("queries/retrieve_course.sql"));

                let course = query
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(course)
            }
            .boxed()
        }

        fn delete_course(&self, id: Id) -> BoxFuture<Result<(), BackendError>> {
            async move {
                let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

                sqlx::query(include_str!("queries/delete_records_by_course.sql"))
                    .bind(id)
                    .execute(&mut tx)
                    .await
                    .map_err(map_sqlx_error)?;

                let count = sqlx::query(include_str!("queries/delete_course.sql"))
                    .bind(id)
                    .execute(&mut tx)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if count == 0 {
                    return Err(BackendError::NonExistentCourse);
                }

                tx.commit().await.map_err(map_sqlx_error)?;

                Ok(())
            }
            .boxed()
        }

        fn insert_student(
            &self,
            account_id: &Uuid,
            birth_date: &str,
        ) -> BoxFuture<Result<Student, BackendError>> {
            let account_id = *account_id;
            let birth_date = birth_date.to_owned();

            async move {
                let query = sqlx::query(include_str!("queries/create_student.sql"));

                query
                    .bind(account_id)
                    .bind(&birth_date)
                    .bind(DEFAULT_PROFILE_PIC)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(Student::new(
                    account_id,
                    birth_date,
                    DEFAULT_PROFILE_PIC.to_owned(),
                ))
            }
            .boxed()
        }

        fn retrieve_student(
            &self,
            account_id: &Uuid,
        ) -> BoxFuture<Result<Option<Student>, BackendError>> {
            let account_id = *account_id;

            async move {
                let query =
                    sqlx::query_as::<_, Student>(include_str!("queries/retrieve_student.sql"));

                let student = query
                    .bind(account_id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(student)
            }
            .boxed()
        }

        fn update_student(&self, student: &Student) -> BoxFuture<Result<(), BackendError>> {
            let student = student.clone();

            async move {
                let query = sqlx::query(include_str!("queries/update_student.sql"));

                let count = query
                    .bind(student.account_id())
                    .bind(student.birth_date())
                    .bind(student.profile_pic())
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if count == 0 {
                    return Err(BackendError::NonExistentId(*student.account_id()));
                }

                Ok(())
            }
            .boxed()
        }

        fn delete_student(&self, account_id: &Uuid) -> BoxFuture<Result<(), BackendError>> {
            let account_id = *account_id;

            async move {
                let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

                sqlx::query(include_str!("queries/delete_records_by_owner.sql"))
                    .bind(account_id)
                    .execute(&mut tx)
                    .await
                    .map_err(map_sqlx_error)?;

                let count = sqlx::query(include_str!("queries/delete_student.sql"))
                    .bind(account_id)
                    .execute(&mut tx)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if count == 0 {
                    return Err(BackendError::NonExistentId(account_id));
                }

                tx.commit().await.map_err(map_sqlx_error)?;

                Ok(())
            }
            .boxed()
        }

        fn record_exists(
            &self,
            name: &str,
            owner_id: &Uuid,
        ) -> BoxFuture<Result<bool, BackendError>> {
            let name = name.to_owned();
            let owner_id = *owner_id;

            async move {
                let query = sqlx::query_as(include_str!("queries/record_exists.sql"));

                let (exists,): (bool,) = query
                    .bind(&name)
                    .bind(owner_id)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(exists)
            }
            .boxed()
        }

        fn insert_record(&self, record: NewRecord) -> BoxFuture<Result<Record, BackendError>> {
            async move {
                let id = Uuid::new_v4();
                let query = sqlx::query(include_str!("queries/create_record.sql"));

                query
                    .bind(id)
                    .bind(&record.name)
                    .bind(record.owner_id)
                    .bind(record.course_id)
                    .bind(&record.filename)
                    .bind(record.price)
                    .bind(0i32)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(Record::new(
                    id,
                    record.name,
                    record.owner_id,
                    record.course_id,
                    record.filename,
                    record.price,
                    0,
                ))
            }
            .boxed()
        }

        fn retrieve_record(&self, id: &Uuid) -> BoxFuture<Result<Option<Record>, BackendError>> {
            let id = *id;

            async move {
                let query =
                    sqlx::query_as::<_, Record>(include_str!("queries/retrieve_record.sql"));

                let record = query
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(record)
            }
            .boxed()
        }

        fn records_by_owner(
            &self,
            owner_id: &Uuid,
        ) -> BoxFuture<Result<Vec<Record>, BackendError>> {
            let owner_id = *owner_id;

            async move {
                let query =
                    sqlx::query_as::<_, Record>(include_str!("queries/records_by_owner.sql"));

                let records = query
                    .bind(owner_id)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(records)
            }
            .boxed()
        }

        fn delete_record(&self, id: &Uuid) -> BoxFuture<Result<(), BackendError>> {
            let id = *id;

            async move {
                let query = sqlx::query(include_str!("queries/delete_record.sql"));

                let count = query
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if count == 0 {
                    return Err(BackendError::NonExistentId(id));
                }

                Ok(())
            }
            .boxed()
        }
    }

    fn map_sqlx_error(error: sqlx::Error) -> BackendError {
        use sqlx::Error;

        match error {
            Error::Database(ref e) if e.constraint() == Some(ACCOUNTS_USERNAME_CONSTRAINT) => {
                BackendError::UsernameTaken
            }
            Error::Database(ref e) if e.constraint() == Some(COURSES_NAME_CONSTRAINT) => {
                BackendError::CourseNameTaken
            }
            Error::Database(ref e) if e.constraint() == Some(RECORDS_NAME_OWNER_CONSTRAINT) => {
                BackendError::RecordAlreadyExists
            }
            Error::Database(ref e) if e.constraint() == Some(RECORDS_OWNER_CONSTRAINT) => {
                BackendError::NonExistentOwner
            }
            Error::Database(ref e) if e.constraint() == Some(RECORDS_COURSE_CONSTRAINT) => {
                BackendError::NonExistentCourse
            }
            Error::Database(ref e) if e.constraint() == Some(STUDENTS_ACCOUNT_CONSTRAINT) => {
                BackendError::NonExistentAccount
            }
            _ => BackendError::Sqlx { source: error },
        }
    }
}
