//! Domain primitives, aggregates and services.
//!
//! Purpose: Define the strongly typed connection model and the service that
//! owns the pairing lifecycle. Adapters depend on this module, never the
//! other way round.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - ConnectionRecord (alias to `connection::ConnectionRecord`): persisted
//!   state of one pairing.
//! - ConnectionService: implementation of the connection driving ports.

pub mod connection;
pub mod connection_code;
pub mod connection_service;
pub mod error;
pub mod photo;
pub mod ports;
pub mod trace_id;

pub use self::connection::{
    CaptionUpdate, ConnectionId, ConnectionIdValidationError, ConnectionRecord, ConnectionState,
    PhotoUpdate,
};
#[cfg(test)]
pub use self::connection_code::MockConnectionCodeSource;
pub use self::connection_code::{
    CONNECTION_CODE_ALPHABET, CodeLength, CodeLengthError, ConnectionCodeSource,
    RandomConnectionCodes, generate_connection_code,
};
pub use self::connection_service::{
    CONNECTION_NOT_FOUND, ConnectionService, ConnectionServiceSettings, UPLOAD_INCOMPLETE,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::photo::{
    DEFAULT_PHOTO_CONTENT_TYPE, DEFAULT_PHOTO_EXTENSION, PhotoPath, PhotoPathError, PhotoUpload,
    PublicPhotoBase, StoredPhoto, photo_extension,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use snapbeam::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<()> {
///     Err(Error::not_found("Connection not found"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
