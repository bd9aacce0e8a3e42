//! Port for connection record persistence.
//!
//! The [`ConnectionRepository`] is the Record Store: a key-value map of
//! connection records keyed by [`ConnectionId`]. Each call is atomic on its
//! own; read-modify-write sequences are not serialised, so concurrent updates
//! to one connection resolve as last-write-wins.

use async_trait::async_trait;

use crate::domain::{ConnectionId, ConnectionRecord};

use super::define_port_error;

define_port_error! {
    /// Errors raised by connection record store adapters.
    pub enum ConnectionRepositoryError {
        /// The backing store could not be reached.
        Connection { message: String } =>
            "connection store unavailable: {message}",
        /// A read or write command failed.
        Query { message: String } =>
            "connection store query failed: {message}",
        /// A stored record could not be encoded or decoded.
        Serialization { message: String } =>
            "connection record serialisation failed: {message}",
    }
}

/// Port for storing, loading and removing connection records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// Load the record for `connection_id`, or `None` when absent.
    async fn find(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<ConnectionRecord>, ConnectionRepositoryError>;

    /// Insert or overwrite the record keyed by its connection id.
    async fn save(&self, record: &ConnectionRecord) -> Result<(), ConnectionRepositoryError>;

    /// Remove the record. Removing an absent record succeeds.
    async fn delete(&self, connection_id: &ConnectionId) -> Result<(), ConnectionRepositoryError>;
}

/// Fixture repository that stores nothing.
///
/// Lookups always miss and writes are discarded. Use it where persistence is
/// not under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureConnectionRepository;

#[async_trait]
impl ConnectionRepository for FixtureConnectionRepository {
    async fn find(
        &self,
        _connection_id: &ConnectionId,
    ) -> Result<Option<ConnectionRecord>, ConnectionRepositoryError> {
        Ok(None)
    }

    async fn save(&self, _record: &ConnectionRecord) -> Result<(), ConnectionRepositoryError> {
        Ok(())
    }

    async fn delete(
        &self,
        _connection_id: &ConnectionId,
    ) -> Result<(), ConnectionRepositoryError> {
        Ok(())
    }
}
