//! Driving port for connection mutations.
//!
//! HTTP handlers call [`ConnectionCommand`] to create connections, replace
//! the shared photo, upload photo binaries and delete connections.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ConnectionId, ConnectionRecord, Error, PhotoUpdate, PhotoUpload};

/// Request to replace parts of a connection's photo slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePhotoRequest {
    /// Target connection.
    pub connection_id: ConnectionId,
    /// Fields to change; absent fields keep their stored values.
    pub update: PhotoUpdate,
}

/// Result of a successful photo update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdatePhotoResponse {
    /// Timestamp written to the record.
    pub updated_at: DateTime<Utc>,
}

/// Result of a successful photo upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPhotoResponse {
    /// Public locator of the stored blob, now the connection's latest photo.
    pub photo_url: String,
}

/// Driving port for connection mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionCommand: Send + Sync {
    /// Create a connection under a freshly generated code.
    async fn create(&self) -> Result<ConnectionRecord, Error>;

    /// Apply a partial photo update to an existing connection.
    ///
    /// # Errors
    ///
    /// Returns a `not_found` error when the connection does not exist.
    async fn update_photo(&self, request: UpdatePhotoRequest)
    -> Result<UpdatePhotoResponse, Error>;

    /// Store an uploaded photo and make it the connection's latest photo.
    ///
    /// Creates the connection when it does not exist yet.
    async fn upload_photo(&self, upload: PhotoUpload) -> Result<UploadPhotoResponse, Error>;

    /// Delete a connection. Deleting an unknown connection succeeds.
    async fn delete(&self, connection_id: &ConnectionId) -> Result<(), Error>;
}

/// Fixture command that echoes inputs without persisting anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureConnectionCommand;

#[async_trait]
impl ConnectionCommand for FixtureConnectionCommand {
    async fn create(&self) -> Result<ConnectionRecord, Error> {
        let id = ConnectionId::new("FIXTURE8")
            .map_err(|err| Error::internal(format!("fixture id rejected: {err}")))?;
        Ok(ConnectionRecord::new(id, Utc::now()))
    }

    async fn update_photo(
        &self,
        _request: UpdatePhotoRequest,
    ) -> Result<UpdatePhotoResponse, Error> {
        Ok(UpdatePhotoResponse {
            updated_at: Utc::now(),
        })
    }

    async fn upload_photo(&self, upload: PhotoUpload) -> Result<UploadPhotoResponse, Error> {
        Ok(UploadPhotoResponse {
            photo_url: format!("fixture://{}", upload.connection_id),
        })
    }

    async fn delete(&self, _connection_id: &ConnectionId) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn fixture_create_returns_empty_record() {
        let record = FixtureConnectionCommand
            .create()
            .await
            .expect("fixture create succeeds");

        assert_eq!(record.connection_id.as_str(), "FIXTURE8");
        assert_eq!(record.created_at, record.updated_at);
        assert!(record.last_photo_url.is_none());
    }

    #[tokio::test]
    async fn fixture_upload_reports_a_locator() {
        let upload = PhotoUpload {
            connection_id: ConnectionId::new("AB3D9F2K").expect("id"),
            bytes: Bytes::from_static(b"jpeg"),
            content_type: None,
            filename: None,
        };

        let response = FixtureConnectionCommand
            .upload_photo(upload)
            .await
            .expect("fixture upload succeeds");

        assert_eq!(response.photo_url, "fixture://AB3D9F2K");
    }
}
