//! Process-local photo store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{PhotoStore, PhotoStoreError};
use crate::domain::{PhotoPath, StoredPhoto};

/// In-memory [`PhotoStore`]; clones share the same blobs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPhotoStore {
    blobs: Arc<Mutex<HashMap<String, StoredPhoto>>>,
}

impl InMemoryPhotoStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, StoredPhoto>>, PhotoStoreError> {
        self.blobs
            .lock()
            .map_err(|_| PhotoStoreError::unavailable("photo map lock poisoned"))
    }
}

#[async_trait]
impl PhotoStore for InMemoryPhotoStore {
    async fn put(&self, path: &PhotoPath, photo: &StoredPhoto) -> Result<(), PhotoStoreError> {
        self.lock()?.insert(path.to_string(), photo.clone());
        Ok(())
    }

    async fn get(&self, path: &PhotoPath) -> Result<Option<StoredPhoto>, PhotoStoreError> {
        Ok(self.lock()?.get(&path.to_string()).cloned())
    }
}
