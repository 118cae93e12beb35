use std::sync::Arc;

use log::Logger;

use crate::db::Db;
use crate::store::Store;

/// A file store erased down to raw byte payloads.
pub type VecStore<O> = dyn Store<Output = O, Raw = Vec<u8>> + Send + Sync;

/// Bound required of a store's output type to travel through the
/// operations.
pub trait SafeStore: Clone + Send + Sync {}

impl<T: Clone + Send + Sync> SafeStore for T {}

/// The shared dependencies every operation runs against.
#[derive(Clone)]
pub struct Environment<O: SafeStore> {
    pub logger: Arc<Logger>,
    pub db: Arc<dyn Db + Send + Sync>,
    pub store: Arc<VecStore<O>>,
}

impl<O: SafeStore> Environment<O> {
    pub fn new(
        logger: Arc<Logger>,
        db: Arc<dyn Db + Send + Sync>,
        store: Arc<VecStore<O>>,
    ) -> Self {
        Self { logger, db, store }
    }
}
