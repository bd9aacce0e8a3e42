//! Record store adapters implementing [`ConnectionRepository`].
//!
//! Both adapters hold connection records as JSON documents under
//! `connection:{id}` keys, so a record written by one reads back identically
//! from the other.
//!
//! [`ConnectionRepository`]: crate::domain::ports::ConnectionRepository

mod memory;
mod redis;

pub use self::memory::InMemoryConnectionRepository;
pub use self::redis::{RedisConnectionRepository, RedisPoolConfig};

use crate::domain::ports::ConnectionRepositoryError;
use crate::domain::{ConnectionId, ConnectionRecord};

/// Namespace prefix for connection records.
pub const RECORD_KEY_PREFIX: &str = "connection:";

/// Store key for a connection record.
pub(crate) fn record_key(connection_id: &ConnectionId) -> String {
    format!("{RECORD_KEY_PREFIX}{connection_id}")
}

pub(crate) fn encode_record(record: &ConnectionRecord) -> Result<String, ConnectionRepositoryError> {
    serde_json::to_string(record)
        .map_err(|err| ConnectionRepositoryError::serialization(err.to_string()))
}

pub(crate) fn decode_record(raw: &str) -> Result<ConnectionRecord, ConnectionRepositoryError> {
    serde_json::from_str(raw)
        .map_err(|err| ConnectionRepositoryError::serialization(err.to_string()))
}
