use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::course::Id;
use crate::environment::{Environment, SafeStore};
use crate::errors::BackendError;
use crate::normalization;
use crate::store::{StoreKey, Upload};
use crate::validation;

/// A purchasable audio record owned by a student.
#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Record {
    id: Uuid,
    name: String,
    owner_id: Uuid,
    course_id: Id,
    filename: String,
    price: f64,
    downloads: i32,
}

impl Record {
    pub fn new(
        id: Uuid,
        name: String,
        owner_id: Uuid,
        course_id: Id,
        filename: String,
        price: f64,
        downloads: i32,
    ) -> Self {
        Record {
            id,
            name,
            owner_id,
            course_id,
            filename,
            price,
            downloads,
        }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner_id(&self) -> &Uuid {
        &self.owner_id
    }

    pub fn course_id(&self) -> Id {
        self.course_id
    }

    /// The original filename of the uploaded audio.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn downloads(&self) -> i32 {
        self.downloads
    }

    /// Relative path of the stored audio file, namespaced by owner.
    pub fn storage_path(&self) -> String {
        StoreKey::new(self.owner_id, &self.filename).relative_path()
    }
}

/// The submitted price field, as it arrived from the outer API layer.
///
/// Only an actual number is acceptable; anything else is rejected by
/// validation even if it would parse as one.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Price {
    /// A numeric amount in the marketplace currency.
    Amount(f64),

    /// Anything else submitted in the price field.
    Other(serde_json::Value),
}

/// A record submission as received from the outer API layer. Every
/// field is optional here; presence is enforced by validation.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RecordSubmission {
    /// The name provided. Must be unique per owner after normalization.
    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize_option")]
    pub name: Option<String>,

    /// The ID of the student submitting the record.
    pub owner_id: Option<Uuid>,

    /// The ID of the course the record belongs to.
    pub course_id: Option<Id>,

    /// The asking price.
    pub price: Option<Price>,
}

/// A validated record ready for insertion. The repository initializes
/// the download counter to zero.
#[derive(Clone, Debug)]
pub struct NewRecord {
    pub(crate) name: String,
    pub(crate) owner_id: Uuid,
    pub(crate) course_id: Id,
    pub(crate) filename: String,
    pub(crate) price: f64,
}

/// Validates a submission and persists the record with its audio
/// payload.
///
/// Checks run fail-fast, in order: presence of all five fields, the
/// (name, owner) uniqueness pre-check, the price range, the audio file
/// extension. A missing name or file therefore short-circuits before
/// the extension check. On success the row is written with zero
/// downloads and the payload is saved under the owner's namespace.
pub async fn create<O: SafeStore>(
    environment: &Environment<O>,
    submission: RecordSubmission,
    audio: Option<Upload>,
) -> Result<Record, BackendError> {
    debug!(environment.logger, "Validating record submission...");
    let (name, owner_id, course_id, price, audio) = require_parts(submission, audio)?;

    if environment.db.record_exists(&name, &owner_id).await? {
        return Err(BackendError::NameAlreadyExists);
    }

    let price = validation::check_price(&price)?;
    validation::check_audio_extension(&audio.filename)?;

    debug!(environment.logger, "Writing record to database..."; "name" => &name);
    let record = environment
        .db
        .insert_record(NewRecord {
            name,
            owner_id,
            course_id,
            filename: audio.filename.clone(),
            price,
        })
        .await?;

    debug!(environment.logger, "Saving audio to store..."; "id" => %record.id());
    let key = StoreKey::new(owner_id, &audio.filename);
    environment.store.save(&key, audio.data).await?;

    Ok(record)
}

pub async fn retrieve<O: SafeStore>(
    environment: &Environment<O>,
    id: &Uuid,
) -> Result<Option<Record>, BackendError> {
    environment.db.retrieve_record(id).await
}

/// Deletes a record along with its stored audio file.
pub async fn delete<O: SafeStore>(
    environment: &Environment<O>,
    id: &Uuid,
) -> Result<(), BackendError> {
    let record = environment
        .db
        .retrieve_record(id)
        .await?
        .ok_or(BackendError::NonExistentId(*id))?;

    debug!(environment.logger, "Deleting record..."; "id" => %id);

    let key = StoreKey::new(*record.owner_id(), record.filename());
    environment.store.delete(&key).await?;
    environment.db.delete_record(id).await
}

fn require_parts(
    submission: RecordSubmission,
    audio: Option<Upload>,
) -> Result<(String, Uuid, Id, Price, Upload), BackendError> {
    let RecordSubmission {
        name,
        owner_id,
        course_id,
        price,
    } = submission;

    let name = name
        .filter(|name| !normalization::is_blank(name))
        .map(normalization::normalize_name);

    match (name, owner_id, course_id, price, audio) {
        (Some(name), Some(owner_id), Some(course_id), Some(price), Some(audio)) => {
            Ok((name, owner_id, course_id, price, audio))
        }
        _ => Err(BackendError::PartsMissing),
    }
}
