//! Environment-driven server configuration.
//!
//! Every setting has a default so a bare `snapbeam` starts with in-memory
//! stores on port 8080. Present but malformed values are startup errors.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use mockable::Env;
use snapbeam::domain::{CodeLength, ConnectionServiceSettings, PublicPhotoBase};
use snapbeam::inbound::http::state::DEFAULT_MAX_UPLOAD_BYTES;
use snapbeam::outbound::record_store::RedisPoolConfig;

pub(crate) const BIND_ADDR_ENV: &str = "SNAPBEAM_BIND_ADDR";
pub(crate) const REDIS_URL_ENV: &str = "SNAPBEAM_REDIS_URL";
pub(crate) const BLOB_DIR_ENV: &str = "SNAPBEAM_BLOB_DIR";
pub(crate) const PUBLIC_PHOTO_URL_ENV: &str = "SNAPBEAM_PUBLIC_PHOTO_URL";
pub(crate) const CODE_LENGTH_ENV: &str = "SNAPBEAM_CODE_LENGTH";
pub(crate) const CREATE_ATTEMPTS_ENV: &str = "SNAPBEAM_CREATE_ATTEMPTS";
pub(crate) const MAX_UPLOAD_BYTES_ENV: &str = "SNAPBEAM_MAX_UPLOAD_BYTES";
pub(crate) const REDIS_POOL_SIZE_ENV: &str = "SNAPBEAM_REDIS_POOL_SIZE";
pub(crate) const REDIS_CONNECT_TIMEOUT_MS_ENV: &str = "SNAPBEAM_REDIS_CONNECT_TIMEOUT_MS";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PUBLIC_PHOTO_URL: &str = "http://localhost:8080/photos";
const DEFAULT_CREATE_ATTEMPTS: u32 = 5;
const DEFAULT_REDIS_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable is present but cannot be parsed.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Settings needed to build and bind the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) redis_url: Option<String>,
    pub(crate) blob_dir: Option<PathBuf>,
    pub(crate) public_photo_base: PublicPhotoBase,
    pub(crate) code_length: CodeLength,
    pub(crate) create_attempts: u32,
    pub(crate) max_upload_bytes: usize,
    pub(crate) redis_pool_size: u32,
    pub(crate) redis_connect_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            redis_url: None,
            blob_dir: None,
            public_photo_base: PublicPhotoBase::new(DEFAULT_PUBLIC_PHOTO_URL),
            code_length: CodeLength::default(),
            create_attempts: DEFAULT_CREATE_ATTEMPTS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            redis_pool_size: RedisPoolConfig::DEFAULT_MAX_SIZE,
            redis_connect_timeout: Duration::from_millis(DEFAULT_REDIS_CONNECT_TIMEOUT_MS),
        }
    }
}

impl ServerConfig {
    /// Read the configuration from `env`, falling back to defaults for unset
    /// or blank variables.
    pub fn from_env<E: Env>(env: &E) -> Result<Self, ConfigError> {
        let bind_addr = parse_or(env, BIND_ADDR_ENV, "a socket address such as 0.0.0.0:8080", || {
            DEFAULT_BIND_ADDR.parse()
        })?;
        let code_length = match non_blank(env, CODE_LENGTH_ENV) {
            Some(value) => value
                .parse::<usize>()
                .ok()
                .and_then(|length| CodeLength::new(length).ok())
                .ok_or(ConfigError::InvalidEnv {
                    name: CODE_LENGTH_ENV,
                    value,
                    expected: "an integer between 4 and 32",
                })?,
            None => CodeLength::default(),
        };
        let create_attempts =
            positive_or(env, CREATE_ATTEMPTS_ENV, "a positive integer", DEFAULT_CREATE_ATTEMPTS)?;
        let max_upload_bytes = positive_or(
            env,
            MAX_UPLOAD_BYTES_ENV,
            "a positive byte count",
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;
        let redis_pool_size = positive_or(
            env,
            REDIS_POOL_SIZE_ENV,
            "a positive integer",
            RedisPoolConfig::DEFAULT_MAX_SIZE,
        )?;
        let redis_connect_timeout = Duration::from_millis(positive_or(
            env,
            REDIS_CONNECT_TIMEOUT_MS_ENV,
            "a positive number of milliseconds",
            DEFAULT_REDIS_CONNECT_TIMEOUT_MS,
        )?);

        Ok(Self {
            bind_addr,
            redis_url: non_blank(env, REDIS_URL_ENV),
            blob_dir: non_blank(env, BLOB_DIR_ENV).map(PathBuf::from),
            public_photo_base: PublicPhotoBase::new(
                non_blank(env, PUBLIC_PHOTO_URL_ENV)
                    .unwrap_or_else(|| DEFAULT_PUBLIC_PHOTO_URL.to_owned()),
            ),
            code_length,
            create_attempts,
            max_upload_bytes,
            redis_pool_size,
            redis_connect_timeout,
        })
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Redis pool settings, when a record store URL is configured.
    pub(crate) fn redis_pool(&self) -> Option<RedisPoolConfig> {
        self.redis_url.as_ref().map(|url| {
            RedisPoolConfig::new(url.clone())
                .with_max_size(self.redis_pool_size)
                .with_connection_timeout(self.redis_connect_timeout)
        })
    }

    /// Service tunables derived from this configuration.
    pub(crate) fn service_settings(&self) -> ConnectionServiceSettings {
        ConnectionServiceSettings {
            create_attempts: self.create_attempts,
            public_photo_base: self.public_photo_base.clone(),
        }
    }
}

fn non_blank<E: Env>(env: &E, name: &str) -> Option<String> {
    env.string(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn positive_or<E, T>(
    env: &E,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    E: Env,
    T: FromStr + PartialOrd + Default,
{
    match non_blank(env, name) {
        Some(value) => value
            .parse::<T>()
            .ok()
            .filter(|parsed| *parsed > T::default())
            .ok_or(ConfigError::InvalidEnv {
                name,
                value,
                expected,
            }),
        None => Ok(default),
    }
}

fn parse_or<E, T, D>(
    env: &E,
    name: &'static str,
    expected: &'static str,
    default: D,
) -> Result<T, ConfigError>
where
    E: Env,
    T: FromStr,
    D: FnOnce() -> Result<T, T::Err>,
{
    match non_blank(env, name) {
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidEnv {
            name,
            value,
            expected,
        }),
        None => default().map_err(|_| ConfigError::InvalidEnv {
            name,
            value: String::new(),
            expected,
        }),
    }
}
