//! Uploaded photo primitives: blob paths, public locators and payloads.

use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::{ConnectionId, ConnectionIdValidationError};

/// Extension used when a filename carries no usable suffix.
pub const DEFAULT_PHOTO_EXTENSION: &str = "jpg";

/// Content type recorded when the client did not declare one.
pub const DEFAULT_PHOTO_CONTENT_TYPE: &str = "application/octet-stream";

/// Derive the stored extension from a client filename.
///
/// Takes the text after the last `.`, lowercased. Falls back to
/// [`DEFAULT_PHOTO_EXTENSION`] when there is no dot, the suffix is empty, or
/// it contains anything other than ASCII alphanumerics.
///
/// # Examples
/// ```
/// use snapbeam::domain::photo_extension;
///
/// assert_eq!(photo_extension(Some("a.PNG")), "png");
/// assert_eq!(photo_extension(Some("snapshot")), "jpg");
/// assert_eq!(photo_extension(None), "jpg");
/// ```
#[must_use]
pub fn photo_extension(filename: Option<&str>) -> String {
    filename
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, suffix)| suffix)
        .filter(|suffix| !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_alphanumeric()))
        .map_or_else(
            || DEFAULT_PHOTO_EXTENSION.to_owned(),
            str::to_ascii_lowercase,
        )
}

/// Errors raised while parsing a [`PhotoPath`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhotoPathError {
    /// The path did not have the `{connection_id}/{file}` shape.
    #[error("photo path must look like <connection_id>/<timestamp>.<extension>")]
    Malformed,
    /// The connection prefix was invalid.
    #[error(transparent)]
    Connection(#[from] ConnectionIdValidationError),
}

/// Blob-store path of an uploaded photo: `{connection_id}/{unix_millis}.{ext}`.
///
/// Two uploads to the same connection within one millisecond share a path;
/// the later write wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhotoPath {
    connection_id: ConnectionId,
    file_name: String,
}

impl PhotoPath {
    /// Build the path for a fresh upload.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use snapbeam::domain::{ConnectionId, PhotoPath};
    ///
    /// let at = Utc.timestamp_millis_opt(1_700_000_000_123).single().expect("timestamp");
    /// let id = ConnectionId::new("AB3D9F2K").expect("id");
    /// let path = PhotoPath::for_upload(&id, at, Some("a.png")).expect("path-safe id");
    /// assert_eq!(path.to_string(), "AB3D9F2K/1700000000123.png");
    /// ```
    ///
    /// # Errors
    /// Fails when the connection id cannot name a blob directory.
    pub fn for_upload(
        connection_id: &ConnectionId,
        at: DateTime<Utc>,
        filename_hint: Option<&str>,
    ) -> Result<Self, PhotoPathError> {
        connection_id.ensure_path_safe()?;
        Ok(Self {
            connection_id: connection_id.clone(),
            file_name: format!(
                "{}.{}",
                at.timestamp_millis(),
                photo_extension(filename_hint)
            ),
        })
    }

    /// Parse a path received from a client, rejecting traversal attempts.
    pub fn parse(raw: &str) -> Result<Self, PhotoPathError> {
        let (prefix, file_name) = raw.split_once('/').ok_or(PhotoPathError::Malformed)?;
        let connection_id = ConnectionId::path_safe(prefix)?;
        let (stem, extension) = file_name
            .split_once('.')
            .ok_or(PhotoPathError::Malformed)?;
        let well_formed = !stem.is_empty()
            && !extension.is_empty()
            && stem.chars().all(|c| c.is_ascii_digit())
            && extension.chars().all(|c| c.is_ascii_alphanumeric());
        if !well_formed {
            return Err(PhotoPathError::Malformed);
        }
        Ok(Self {
            connection_id,
            file_name: file_name.to_owned(),
        })
    }

    /// Connection that owns the photo.
    #[must_use]
    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    /// File component, `{unix_millis}.{ext}`.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl fmt::Display for PhotoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.connection_id, self.file_name)
    }
}

/// Base URL under which stored photos are publicly reachable.
///
/// Locators are `{base}/{path}`; the base is stored without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicPhotoBase(String);

impl PublicPhotoBase {
    /// Normalise and wrap a base URL.
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self(base.trim_end_matches('/').to_owned())
    }

    /// Public locator for `path`.
    #[must_use]
    pub fn locator_for(&self, path: &PhotoPath) -> String {
        format!("{}/{path}", self.0)
    }

    /// The normalised base URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Photo upload as received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub connection_id: ConnectionId,
    pub bytes: Bytes,
    pub content_type: Option<String>,
    pub filename: Option<String>,
}

/// Photo bytes held by the blob store together with their content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    pub content_type: String,
    pub bytes: Bytes,
}
