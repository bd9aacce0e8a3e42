//! Redis-backed record store.
//!
//! Records are stored as JSON strings under `connection:{id}` keys using a
//! `bb8` pool of multiplexed connections. Each call is a single Redis command
//! and therefore atomic; no TTL is applied.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::bb8::{Pool, PooledConnection, RunError};
use bb8_redis::redis::{AsyncCommands, RedisError, cmd};
use bb8_redis::RedisConnectionManager;
use tracing::{debug, info};

use super::{decode_record, encode_record, record_key};
use crate::domain::ports::{ConnectionRepository, ConnectionRepositoryError};
use crate::domain::{ConnectionId, ConnectionRecord};

/// Pool settings for [`RedisConnectionRepository`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use snapbeam::outbound::record_store::RedisPoolConfig;
///
/// let config = RedisPoolConfig::new("redis://localhost:6379/0")
///     .with_max_size(4)
///     .with_connection_timeout(Duration::from_secs(2));
/// assert_eq!(config.max_size(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisPoolConfig {
    redis_url: String,
    max_size: u32,
    connection_timeout: Duration,
}

impl RedisPoolConfig {
    /// Pool size used unless overridden.
    pub const DEFAULT_MAX_SIZE: u32 = 16;
    /// Checkout timeout used unless overridden.
    pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

    /// Settings for `redis_url` with default sizing.
    pub fn new(redis_url: impl Into<String>) -> Self {
        Self {
            redis_url: redis_url.into(),
            max_size: Self::DEFAULT_MAX_SIZE,
            connection_timeout: Self::DEFAULT_CONNECTION_TIMEOUT,
        }
    }

    /// Set the maximum number of pooled connections.
    #[must_use]
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set how long a checkout waits before failing.
    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Connection URL.
    #[must_use]
    pub fn redis_url(&self) -> &str {
        &self.redis_url
    }

    /// Maximum pooled connections.
    #[must_use]
    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    /// Checkout timeout.
    #[must_use]
    pub fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }
}

/// [`ConnectionRepository`] backed by Redis.
#[derive(Clone)]
pub struct RedisConnectionRepository {
    pool: Pool<RedisConnectionManager>,
}

impl RedisConnectionRepository {
    /// Build a pool from `config` and verify the server answers `PING`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionRepositoryError::Connection`] when the URL is
    /// invalid or the server cannot be reached within the connection timeout.
    pub async fn connect(config: RedisPoolConfig) -> Result<Self, ConnectionRepositoryError> {
        let manager = manager_for(config.redis_url())?;
        let pool = Pool::builder()
            .max_size(config.max_size())
            .connection_timeout(config.connection_timeout())
            .build(manager)
            .await
            .map_err(|err| ConnectionRepositoryError::connection(err.to_string()))?;
        let repository = Self { pool };
        repository.ping().await?;
        info!(max_size = config.max_size(), "redis record store reachable");
        Ok(repository)
    }

    async fn ping(&self) -> Result<(), ConnectionRepositoryError> {
        let mut conn = self.connection().await?;
        let reply: String = cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(map_command_error)?;
        debug!(reply = %reply, "redis ping");
        Ok(())
    }

    async fn connection(
        &self,
    ) -> Result<PooledConnection<'_, RedisConnectionManager>, ConnectionRepositoryError> {
        self.pool.get().await.map_err(map_checkout_error)
    }
}

fn manager_for(redis_url: &str) -> Result<RedisConnectionManager, ConnectionRepositoryError> {
    RedisConnectionManager::new(redis_url)
        .map_err(|err| ConnectionRepositoryError::connection(format!("invalid redis url: {err}")))
}

fn map_checkout_error(err: RunError<RedisError>) -> ConnectionRepositoryError {
    match err {
        RunError::User(inner) => ConnectionRepositoryError::connection(inner.to_string()),
        RunError::TimedOut => ConnectionRepositoryError::connection("timed out waiting for a connection"),
    }
}

fn map_command_error(err: RedisError) -> ConnectionRepositoryError {
    if err.is_io_error() || err.is_connection_dropped() || err.is_timeout() {
        ConnectionRepositoryError::connection(err.to_string())
    } else {
        ConnectionRepositoryError::query(err.to_string())
    }
}

#[async_trait]
impl ConnectionRepository for RedisConnectionRepository {
    async fn find(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<ConnectionRecord>, ConnectionRepositoryError> {
        let key = record_key(connection_id);
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(&key).await.map_err(map_command_error)?;
        debug!(key = %key, hit = raw.is_some(), "redis record lookup");
        raw.as_deref().map(decode_record).transpose()
    }

    async fn save(&self, record: &ConnectionRecord) -> Result<(), ConnectionRepositoryError> {
        let key = record_key(&record.connection_id);
        let encoded = encode_record(record)?;
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(&key, encoded)
            .await
            .map_err(map_command_error)
    }

    async fn delete(&self, connection_id: &ConnectionId) -> Result<(), ConnectionRepositoryError> {
        let key = record_key(connection_id);
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(&key).await.map_err(map_command_error)
    }
}
