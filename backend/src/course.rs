use log::debug;
use serde::{Deserialize, Serialize};

use crate::environment::{Environment, SafeStore};
use crate::errors::BackendError;
use crate::normalization;

/// A course ID in the database.
pub type Id = i16;

/// A named course records can be attached to.
#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Course {
    id: Id,
    name: String,
}

impl Course {
    pub fn new(id: Id, name: String) -> Self {
        Course { id, name }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Creates a course with the given name.
///
/// There is no application-level duplicate pre-check: a name already
/// in use surfaces as the storage layer's uniqueness violation, an
/// integrity failure rather than a validation one.
pub async fn create<O: SafeStore>(
    environment: &Environment<O>,
    name: &str,
) -> Result<Course, BackendError> {
    let name = normalization::normalize_name(name);

    debug!(environment.logger, "Creating course..."; "name" => &name);

    environment.db.create_course(name).await
}

pub async fn retrieve<O: SafeStore>(
    environment: &Environment<O>,
    id: Id,
) -> Result<Option<Course>, BackendError> {
    environment.db.retrieve_course(id).await
}

/// Deletes a course. The repository propagates the deletion to the
/// course's records.
pub async fn delete<O: SafeStore>(
    environment: &Environment<O>,
    id: Id,
) -> Result<(), BackendError> {
    debug!(environment.logger, "Deleting course..."; "id" => id);

    environment.db.delete_course(id).await
}
