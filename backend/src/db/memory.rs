//! An in-memory [`Db`] for isolated tests and embedded use.
//!
//! Enforces the same uniqueness and referential rules as the Postgres
//! implementation, including the explicit deletion propagation.

use std::collections::HashMap;
use std::sync::RwLock;

use futures::future::{BoxFuture, FutureExt};
use uuid::Uuid;

use crate::course::{Course, Id};
use crate::db::Db;
use crate::errors::BackendError;
use crate::record::{NewRecord, Record};
use crate::student::{Account, Student, DEFAULT_PROFILE_PIC};

#[derive(Default)]
pub struct MemoryDb {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    accounts: HashMap<Uuid, Account>,
    students: HashMap<Uuid, Student>,
    courses: HashMap<Id, Course>,
    records: HashMap<Uuid, Record>,
    next_course_id: Id,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Db for MemoryDb {
    fn create_account(
        &self,
        username: &str,
        password: &str,
    ) -> BoxFuture<Result<Account, BackendError>> {
        let username = username.to_owned();
        let password = password.to_owned();

        async move {
            let mut state = self.state.write().unwrap();

            if state
                .accounts
                .values()
                .any(|account| account.username() == username)
            {
                return Err(BackendError::UsernameTaken);
            }

            let account = Account::new(Uuid::new_v4(), username, password);
            state.accounts.insert(*account.id(), account.clone());

            Ok(account)
        }
        .boxed()
    }

    fn retrieve_account(&self, id: &Uuid) -> BoxFuture<Result<Option<Account>, BackendError>> {
        let id = *id;

        async move { Ok(self.state.read().unwrap().accounts.get(&id).cloned()) }.boxed()
    }

    fn delete_account(&self, id: &Uuid) -> BoxFuture<Result<(), BackendError>> {
        let id = *id;

        async move {
            let mut state = self.state.write().unwrap();

            if state.accounts.remove(&id).is_none() {
                return Err(BackendError::NonExistentId(id));
            }

            state.students.remove(&id);
            state.records.retain(|_, record| *record.owner_id() != id);

            Ok(())
        }
        .boxed()
    }

    fn create_course(&self, name: String) -> BoxFuture<Result<Course, BackendError>> {
        async move {
            let mut state = self.state.write().unwrap();

            if state.courses.values().any(|course| course.name() == name) {
                return Err(BackendError::CourseNameTaken);
            }

            state.next_course_id += 1;
            let course = Course::new(state.next_course_id, name);
            state.courses.insert(course.id(), course.clone());

            Ok(course)
        }
        .boxed()
    }

    fn retrieve_course(&self, id: Id) -> BoxFuture<Result<Option<Course>, BackendError>> {
        async move { Ok(self.state.read().unwrap().courses.get(&id).cloned()) }.boxed()
    }

    fn delete_course(&self, id: Id) -> BoxFuture<Result<(), BackendError>> {
        async move {
            let mut state = self.state.write().unwrap();

            if state.courses.remove(&id).is_none() {
                return Err(BackendError::NonExistentCourse);
            }

            state.records.retain(|_, record| record.course_id() != id);

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
            let mut state = self.state.write().unwrap();

            if !state.accounts.contains_key(&account_id) {
                return Err(BackendError::NonExistentAccount);
            }

            let student = Student::new(account_id, birth_date, DEFAULT_PROFILE_PIC.to_owned());
            state.students.insert(account_id, student.clone());

            Ok(student)
        }
        .boxed()
    }

    fn retrieve_student(
        &self,
        account_id: &Uuid,
    ) -> BoxFuture<Result<Option<Student>, BackendError>> {
        let account_id = *account_id;

        async move { Ok(self.state.read().unwrap().students.get(&account_id).cloned()) }.boxed()
    }

    fn update_student(&self, student: &Student) -> BoxFuture<Result<(), BackendError>> {
        let student = student.clone();

        async move {
            let mut state = self.state.write().unwrap();

            if !state.students.contains_key(student.account_id()) {
                return Err(BackendError::NonExistentId(*student.account_id()));
            }

            state.students.insert(*student.account_id(), student);

            Ok(())
        }
        .boxed()
    }

    fn delete_student(&self, account_id: &Uuid) -> BoxFuture<Result<(), BackendError>> {
        let account_id = *account_id;

        async move {
            let mut state = self.state.write().unwrap();

            if state.students.remove(&account_id).is_none() {
                return Err(BackendError::NonExistentId(account_id));
            }

            state
                .records
                .retain(|_, record| *record.owner_id() != account_id);

            Ok(())
        }
        .boxed()
    }

    fn record_exists(&self, name: &str, owner_id: &Uuid) -> BoxFuture<Result<bool, BackendError>> {
        let name = name.to_owned();
        let owner_id = *owner_id;

        async move {
            let state = self.state.read().unwrap();

            Ok(state
                .records
                .values()
                .any(|record| record.name() == name && *record.owner_id() == owner_id))
        }
        .boxed()
    }

    fn insert_record(&self, record: NewRecord) -> BoxFuture<Result<Record, BackendError>> {
        async move {
            let mut state = self.state.write().unwrap();

            if !state.students.contains_key(&record.owner_id) {
                return Err(BackendError::NonExistentOwner);
            }

            if !state.courses.contains_key(&record.course_id) {
                return Err(BackendError::NonExistentCourse);
            }

            if state
                .records
                .values()
                .any(|existing| existing.name() == record.name && *existing.owner_id() == record.owner_id)
            {
                return Err(BackendError::RecordAlreadyExists);
            }

            let record = Record::new(
                Uuid::new_v4(),
                record.name,
                record.owner_id,
                record.course_id,
                record.filename,
                record.price,
                0,
            );
            state.records.insert(*record.id(), record.clone());

            Ok(record)
        }
        .boxed()
    }

    fn retrieve_record(&self, id: &Uuid) -> BoxFuture<Result<Option<Record>, BackendError>> {
        let id = *id;

        async move { Ok(self.state.read().unwrap().records.get(&id).cloned()) }.boxed()
    }

    fn records_by_owner(&self, owner_id: &Uuid) -> BoxFuture<Result<Vec<Record>, BackendError>> {
        let owner_id = *owner_id;

        async move {
            let state = self.state.read().unwrap();

            Ok(state
                .records
                .values()
                .filter(|record| *record.owner_id() == owner_id)
                .cloned()
                .collect())
        }
        .boxed()
    }

    fn delete_record(&self, id: &Uuid) -> BoxFuture<Result<(), BackendError>> {
        let id = *id;

        async move {
            let mut state = self.state.write().unwrap();

            if state.records.remove(&id).is_none() {
                return Err(BackendError::NonExistentId(id));
            }

            Ok(())
        }
        .boxed()
    }
}
