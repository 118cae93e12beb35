use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::environment::{Environment, SafeStore};
use crate::errors::BackendError;
use crate::store::{StoreKey, Upload};
use crate::validation::{self, Accumulator};

/// The profile picture assigned to students who have not uploaded one.
pub const DEFAULT_PROFILE_PIC: &str = "default-profile-pic.png";

/// A user account. Credentials are stored opaquely; authentication is
/// handled by an outer layer.
#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Account {
    id: Uuid,
    username: String,
    password: String,
}

impl Account {
    pub fn new(id: Uuid, username: String, password: String) -> Self {
        Account {
            id,
            username,
            password,
        }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// A student, a one-to-one extension of an account.
///
/// The birth date is kept as submitted text: creation performs no
/// validation, and the format is only checked by
/// [`validate_and_save`].
#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Student {
    account_id: Uuid,
    birth_date: String,
    profile_pic: String,
}

impl Student {
    pub fn new(account_id: Uuid, birth_date: String, profile_pic: String) -> Self {
        Student {
            account_id,
            birth_date,
            profile_pic,
        }
    }

    pub fn account_id(&self) -> &Uuid {
        &self.account_id
    }

    pub fn birth_date(&self) -> &str {
        &self.birth_date
    }

    /// Relative path of the profile picture, or the default placeholder.
    pub fn profile_pic(&self) -> &str {
        &self.profile_pic
    }
}

/// Creates an account with the given credentials and a student linked
/// to it.
///
/// The birth date is stored as given; a duplicate username surfaces as
/// an integrity failure from the storage layer.
pub async fn create<O: SafeStore>(
    environment: &Environment<O>,
    username: &str,
    password: &str,
    birth_date: &str,
) -> Result<Student, BackendError> {
    debug!(environment.logger, "Creating account..."; "username" => username);
    let account = environment.db.create_account(username, password).await?;

    debug!(environment.logger, "Creating student..."; "account_id" => %account.id());
    environment.db.insert_student(account.id(), birth_date).await
}

/// Validates a new birth date and optional profile picture, then
/// applies both.
///
/// Unlike record creation, every check runs and all failures are
/// reported together in one error. If anything failed, nothing is
/// persisted: the student row is untouched and no file is written.
pub async fn validate_and_save<O: SafeStore>(
    environment: &Environment<O>,
    student: &mut Student,
    birth_date: &str,
    picture: Option<Upload>,
) -> Result<(), BackendError> {
    let mut errors = Accumulator::new();

    errors.check(validation::check_birth_date(birth_date));

    if let Some(picture) = &picture {
        errors.check(validation::check_picture_extension(&picture.filename));
    }

    errors.finish()?;

    student.birth_date = birth_date.to_owned();

    if let Some(picture) = picture {
        let key = StoreKey::new(*student.account_id(), &picture.filename);

        debug!(environment.logger, "Saving profile picture..."; "path" => %key);
        environment.store.save(&key, picture.data).await?;

        student.profile_pic = key.relative_path();
    }

    debug!(environment.logger, "Updating student..."; "account_id" => %student.account_id());
    environment.db.update_student(student).await
}

pub async fn retrieve<O: SafeStore>(
    environment: &Environment<O>,
    account_id: &Uuid,
) -> Result<Option<Student>, BackendError> {
    environment.db.retrieve_student(account_id).await
}

/// Deletes a student. The repository propagates the deletion to the
/// student's records; the account itself is kept.
pub async fn delete<O: SafeStore>(
    environment: &Environment<O>,
    account_id: &Uuid,
) -> Result<(), BackendError> {
    debug!(environment.logger, "Deleting student..."; "account_id" => %account_id);

    environment.db.delete_student(account_id).await
}

/// Deletes an account. The repository propagates the deletion to the
/// linked student and transitively to the student's records.
pub async fn delete_account<O: SafeStore>(
    environment: &Environment<O>,
    account_id: &Uuid,
) -> Result<(), BackendError> {
    debug!(environment.logger, "Deleting account..."; "account_id" => %account_id);

    environment.db.delete_account(account_id).await
}
