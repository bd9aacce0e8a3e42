//! Connection aggregate: the single shared photo slot of a device pairing.
//!
//! A connection moves through `NonExistent → Created → HasPhoto`. Every
//! mutation refreshes `updated_at`; deletion returns it to `NonExistent`,
//! which is simply the absence of a stored record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validation errors raised while parsing a [`ConnectionId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionIdValidationError {
    /// The identifier was blank.
    #[error("connection_id must not be empty")]
    Empty,
    /// The identifier exceeded [`ConnectionId::MAX_LEN`].
    #[error("connection_id must be at most {max} characters")]
    TooLong { max: usize },
    /// The identifier contained a character outside `[A-Za-z0-9_-]`.
    #[error("connection_id contains invalid character {character:?}")]
    InvalidCharacter { character: char },
}

/// Identifier of a connection.
///
/// Any non-blank string names a connection; surrounding whitespace is trimmed
/// and case is preserved. Identifiers that also name blob-store directories
/// must additionally be path-safe: 1 to 64 ASCII alphanumerics, `-` or `_`
/// (see [`ConnectionId::ensure_path_safe`]).
///
/// # Examples
/// ```
/// use snapbeam::domain::ConnectionId;
///
/// let id = ConnectionId::new(" AB3D9F2K ").expect("valid id");
/// assert_eq!(id.as_ref(), "AB3D9F2K");
/// assert!(ConnectionId::new("   ").is_err());
///
/// let dotted = ConnectionId::new("room.42").expect("lookup id");
/// assert!(dotted.ensure_path_safe().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Longest path-safe identifier.
    pub const MAX_LEN: usize = 64;

    /// Construct an identifier from any non-blank string.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ConnectionIdValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ConnectionIdValidationError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Construct an identifier that is safe to use as a blob directory.
    pub fn path_safe(raw: impl AsRef<str>) -> Result<Self, ConnectionIdValidationError> {
        let id = Self::new(raw)?;
        id.ensure_path_safe()?;
        Ok(id)
    }

    /// Check the identifier can name a blob-store directory.
    pub fn ensure_path_safe(&self) -> Result<(), ConnectionIdValidationError> {
        if self.0.chars().count() > Self::MAX_LEN {
            return Err(ConnectionIdValidationError::TooLong { max: Self::MAX_LEN });
        }
        if let Some(character) = self
            .0
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(ConnectionIdValidationError::InvalidCharacter { character });
        }
        Ok(())
    }

    /// Wrap a code produced by the connection-code generator, whose alphabet
    /// is a subset of the path-safe characters.
    pub(crate) fn from_generated(code: String) -> Self {
        Self(code)
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for ConnectionId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = ConnectionIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConnectionId> for String {
    fn from(value: ConnectionId) -> Self {
        value.0
    }
}

/// Observable lifecycle state of a stored connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Created, no photo sent yet.
    Created,
    /// At least one photo has been delivered.
    HasPhoto,
}

/// How an update treats the stored caption.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CaptionUpdate {
    /// The request did not mention a caption; keep the stored one.
    #[default]
    Keep,
    /// The request explicitly cleared the caption.
    Clear,
    /// Replace the caption.
    Set(String),
}

impl CaptionUpdate {
    /// Interpret a request field that distinguishes "absent" (`None`) from
    /// "explicitly null" (`Some(None)`).
    ///
    /// An empty string clears, as does an explicit null.
    ///
    /// # Examples
    /// ```
    /// use snapbeam::domain::CaptionUpdate;
    ///
    /// assert_eq!(CaptionUpdate::from_request(None), CaptionUpdate::Keep);
    /// assert_eq!(CaptionUpdate::from_request(Some(Some(String::new()))), CaptionUpdate::Clear);
    /// assert_eq!(
    ///     CaptionUpdate::from_request(Some(Some("hi".to_owned()))),
    ///     CaptionUpdate::Set("hi".to_owned())
    /// );
    /// ```
    #[must_use]
    pub fn from_request(field: Option<Option<String>>) -> Self {
        match field {
            None => Self::Keep,
            Some(None) => Self::Clear,
            Some(Some(caption)) if caption.is_empty() => Self::Clear,
            Some(Some(caption)) => Self::Set(caption),
        }
    }
}

/// Partial update applied to a connection's photo slot.
///
/// Absent fields leave stored values untouched. Empty photo strings count as
/// absent: photos are replaced, never cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoUpdate {
    /// New blob-store locator.
    pub photo_url: Option<String>,
    /// New inline encoded image.
    pub photo_base64: Option<String>,
    /// Caption handling.
    pub caption: CaptionUpdate,
}

impl PhotoUpdate {
    /// Update that only replaces the photo locator.
    #[must_use]
    pub fn with_photo_url(url: impl Into<String>) -> Self {
        Self {
            photo_url: Some(url.into()),
            ..Self::default()
        }
    }
}

/// Persisted state of one connection.
///
/// Serialises to the record-store layout
/// `{connection_id, last_photo_url, last_caption, last_photo_base64, created_at, updated_at}`
/// with RFC 3339 timestamps. Missing optional members deserialise as absent so
/// records written by older clients still load.
///
/// ## Invariants
/// - `updated_at >= created_at`.
/// - A fresh record has no photo and no caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub connection_id: ConnectionId,
    #[serde(default)]
    pub last_photo_url: Option<String>,
    #[serde(default)]
    pub last_caption: Option<String>,
    #[serde(default)]
    pub last_photo_base64: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConnectionRecord {
    /// Create an empty record stamped at `now`.
    #[must_use]
    pub fn new(connection_id: ConnectionId, now: DateTime<Utc>) -> Self {
        Self {
            connection_id,
            last_photo_url: None,
            last_caption: None,
            last_photo_base64: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        if self.last_photo_url.is_some() || self.last_photo_base64.is_some() {
            ConnectionState::HasPhoto
        } else {
            ConnectionState::Created
        }
    }

    /// Apply a partial update and refresh `updated_at`.
    pub fn apply(&mut self, update: PhotoUpdate, now: DateTime<Utc>) {
        let PhotoUpdate {
            photo_url,
            photo_base64,
            caption,
        } = update;

        if let Some(url) = photo_url.filter(|v| !v.is_empty()) {
            self.last_photo_url = Some(url);
        }
        if let Some(inline) = photo_base64.filter(|v| !v.is_empty()) {
            self.last_photo_base64 = Some(inline);
        }
        match caption {
            CaptionUpdate::Keep => {}
            CaptionUpdate::Clear => self.last_caption = None,
            CaptionUpdate::Set(text) => self.last_caption = Some(text),
        }
        self.touch(now);
    }

    /// Refresh `updated_at`, never letting it fall behind `created_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }
}
