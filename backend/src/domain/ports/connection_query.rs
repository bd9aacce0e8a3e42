//! Driving port for connection reads.

use async_trait::async_trait;

use crate::domain::{ConnectionId, ConnectionRecord, Error, PhotoPath, StoredPhoto};

/// Domain use-case port for reading connections and stored photos.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionQuery: Send + Sync {
    /// Fetch the current record of a connection.
    ///
    /// # Errors
    ///
    /// Returns a `not_found` error when the connection does not exist.
    async fn latest(&self, connection_id: &ConnectionId) -> Result<ConnectionRecord, Error>;

    /// Read an uploaded photo back from the blob store.
    async fn fetch_photo(&self, path: &PhotoPath) -> Result<StoredPhoto, Error>;
}

/// Fixture query that knows no connections.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureConnectionQuery;

#[async_trait]
impl ConnectionQuery for FixtureConnectionQuery {
    async fn latest(&self, _connection_id: &ConnectionId) -> Result<ConnectionRecord, Error> {
        Err(Error::not_found("Connection not found"))
    }

    async fn fetch_photo(&self, _path: &PhotoPath) -> Result<StoredPhoto, Error> {
        Err(Error::not_found("Photo not found"))
    }
}
