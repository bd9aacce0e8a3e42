//! Process-local record store.
//!
//! Used for local runs and tests when no Redis URL is configured. Records
//! vanish when the process exits.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{decode_record, encode_record, record_key};
use crate::domain::ports::{ConnectionRepository, ConnectionRepositoryError};
use crate::domain::{ConnectionId, ConnectionRecord};

/// In-memory [`ConnectionRepository`] guarded by a mutex.
///
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConnectionRepository {
    records: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryConnectionRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, ConnectionRepositoryError> {
        self.records
            .lock()
            .map_err(|_| ConnectionRepositoryError::connection("record map lock poisoned"))
    }
}

#[async_trait]
impl ConnectionRepository for InMemoryConnectionRepository {
    async fn find(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<ConnectionRecord>, ConnectionRepositoryError> {
        let raw = self.lock()?.get(&record_key(connection_id)).cloned();
        raw.as_deref().map(decode_record).transpose()
    }

    async fn save(&self, record: &ConnectionRecord) -> Result<(), ConnectionRepositoryError> {
        let encoded = encode_record(record)?;
        self.lock()?
            .insert(record_key(&record.connection_id), encoded);
        Ok(())
    }

    async fn delete(&self, connection_id: &ConnectionId) -> Result<(), ConnectionRepositoryError> {
        self.lock()?.remove(&record_key(connection_id));
        Ok(())
    }
}
