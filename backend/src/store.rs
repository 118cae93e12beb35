use std::fmt;
use std::path::PathBuf;

use futures::future::{BoxFuture, FutureExt};
use uuid::Uuid;

use crate::errors::BackendError;

pub mod mock;

/// An uploaded file as received from the outer API layer.
#[derive(Clone, Debug)]
pub struct Upload {
    /// The original filename, used for extension checks and storage
    /// paths.
    pub filename: String,

    /// The raw contents.
    pub data: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Upload {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// Addresses a stored file, namespaced by the owning account.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoreKey {
    account_id: Uuid,
    filename: String,
}

impl StoreKey {
    pub fn new(account_id: Uuid, filename: impl Into<String>) -> Self {
        StoreKey {
            account_id,
            filename: filename.into(),
        }
    }

    /// Relative path of the file: `user_{account}/{filename}`.
    pub fn relative_path(&self) -> String {
        format!("user_{}/{}", self.account_id, self.filename)
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.relative_path())
    }
}

pub trait Store: Send + Sync {
    /// The type of successful result.
    type Output;

    /// The type of raw data.
    type Raw;

    /// Deletes the given object.
    fn delete(&self, key: &StoreKey) -> BoxFuture<Result<(), BackendError>>;

    /// Saves the given data under the given key.
    fn save(&self, key: &StoreKey, raw: Self::Raw) -> BoxFuture<Result<Self::Output, BackendError>>;
}

/// A store that writes files under a local media root.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Creates a new instance rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsStore { root: root.into() }
    }

    pub fn from_env() -> Self {
        use crate::config::get_variable;

        FsStore::new(get_variable("BACKEND_MEDIA_ROOT"))
    }
}

impl Store for FsStore {
    type Output = ();
    type Raw = Vec<u8>;

    fn delete(&self, key: &StoreKey) -> BoxFuture<Result<(), BackendError>> {
        delete(self, key.clone()).boxed()
    }

    fn save(&self, key: &StoreKey, raw: Vec<u8>) -> BoxFuture<Result<(), BackendError>> {
        save(self, key.clone(), raw).boxed()
    }
}

async fn delete(store: &FsStore, key: StoreKey) -> Result<(), BackendError> {
    let path = store.root.join(key.relative_path());

    tokio::fs::remove_file(&path)
        .await
        .map_err(|source| BackendError::DeleteFailed { source })
}

async fn save(store: &FsStore, key: StoreKey, raw: Vec<u8>) -> Result<(), BackendError> {
    let path = store.root.join(key.relative_path());

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| BackendError::SaveFailed { source })?;
    }

    tokio::fs::write(&path, &raw)
        .await
        .map_err(|source| BackendError::SaveFailed { source })
}
