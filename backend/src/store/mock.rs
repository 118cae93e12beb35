use std::collections::HashMap;
use std::sync::RwLock;

use futures::future::{BoxFuture, FutureExt};

use crate::errors::BackendError;
use crate::store::{Store, StoreKey};

/// A store that keeps files in memory, for tests.
#[derive(Default)]
pub struct MockStore {
    map: RwLock<HashMap<String, Vec<u8>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a file was saved under the given relative path.
    pub fn contains(&self, path: &str) -> bool {
        self.map.read().unwrap().contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().unwrap().is_empty()
    }

    /// Returns the saved contents under the given relative path.
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.map.read().unwrap().get(path).cloned()
    }
}

impl Store for MockStore {
    type Output = ();
    type Raw = Vec<u8>;

    fn delete(&self, key: &StoreKey) -> BoxFuture<Result<(), BackendError>> {
        let path = key.relative_path();

        async move {
            self.map.write().unwrap().remove(&path);

            Ok(())
        }
        .boxed()
    }

    fn save(&self, key: &StoreKey, raw: Vec<u8>) -> BoxFuture<Result<(), BackendError>> {
        let path = key.relative_path();

        async move {
            self.map.write().unwrap().insert(path, raw);

            Ok(())
        }
        .boxed()
    }
}
