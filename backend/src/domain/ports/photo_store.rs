//! Port for uploaded photo blobs.
//!
//! The [`PhotoStore`] is the Blob Store: object storage addressed by
//! [`PhotoPath`]. Writing an existing path overwrites it.

use async_trait::async_trait;

use crate::domain::{PhotoPath, StoredPhoto};

use super::define_port_error;

define_port_error! {
    /// Errors raised by photo store adapters.
    pub enum PhotoStoreError {
        /// The backing store could not be reached.
        Unavailable { message: String } =>
            "photo store unavailable: {message}",
        /// Reading or writing a blob failed.
        Io { path: String, message: String } =>
            "photo store I/O failed for {path}: {message}",
    }
}

/// Port for writing and reading photo blobs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Store `photo` at `path`, replacing any existing blob.
    async fn put(&self, path: &PhotoPath, photo: &StoredPhoto) -> Result<(), PhotoStoreError>;

    /// Read the blob at `path`, or `None` when nothing is stored there.
    async fn get(&self, path: &PhotoPath) -> Result<Option<StoredPhoto>, PhotoStoreError>;
}

/// Fixture store that accepts writes and holds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePhotoStore;

#[async_trait]
impl PhotoStore for FixturePhotoStore {
    async fn put(&self, _path: &PhotoPath, _photo: &StoredPhoto) -> Result<(), PhotoStoreError> {
        Ok(())
    }

    async fn get(&self, _path: &PhotoPath) -> Result<Option<StoredPhoto>, PhotoStoreError> {
        Ok(None)
    }
}
