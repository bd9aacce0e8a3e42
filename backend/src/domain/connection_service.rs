//! Connection domain service.
//!
//! Implements the connection command and query ports over the record store
//! and the photo store. All business rules of the pairing lifecycle live here:
//! code allocation, partial photo updates, upload-with-create-on-miss and
//! idempotent deletion.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    ConnectionCommand, ConnectionQuery, ConnectionRepository, ConnectionRepositoryError,
    PhotoStore, PhotoStoreError, UpdatePhotoRequest, UpdatePhotoResponse, UploadPhotoResponse,
};
use crate::domain::{
    ConnectionCodeSource, ConnectionId, ConnectionRecord, DEFAULT_PHOTO_CONTENT_TYPE, Error,
    PhotoPath, PhotoPathError, PhotoUpdate, PhotoUpload, PublicPhotoBase, StoredPhoto,
};

/// Message reported for operations on unknown connections.
pub const CONNECTION_NOT_FOUND: &str = "Connection not found";

/// Message reported when an upload lacks its file or connection id.
pub const UPLOAD_INCOMPLETE: &str = "photo and connection_id are required";

/// Tunables for [`ConnectionService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionServiceSettings {
    /// How many generated codes `create` tries before giving up.
    pub create_attempts: u32,
    /// Base URL used to build public photo locators.
    pub public_photo_base: PublicPhotoBase,
}

impl Default for ConnectionServiceSettings {
    fn default() -> Self {
        Self {
            create_attempts: 5,
            public_photo_base: PublicPhotoBase::new("http://localhost:8080/photos"),
        }
    }
}

/// Connection service implementing the connection driving ports.
///
/// Stores may be concrete adapters or trait objects chosen at startup.
pub struct ConnectionService<R: ?Sized, P: ?Sized> {
    connection_repo: Arc<R>,
    photo_store: Arc<P>,
    clock: Arc<dyn Clock>,
    codes: Arc<dyn ConnectionCodeSource>,
    settings: ConnectionServiceSettings,
}

impl<R: ?Sized, P: ?Sized> Clone for ConnectionService<R, P> {
    fn clone(&self) -> Self {
        Self {
            connection_repo: Arc::clone(&self.connection_repo),
            photo_store: Arc::clone(&self.photo_store),
            clock: Arc::clone(&self.clock),
            codes: Arc::clone(&self.codes),
            settings: self.settings.clone(),
        }
    }
}

impl<R: ?Sized, P: ?Sized> ConnectionService<R, P> {
    /// Create a service over the given stores.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use snapbeam::domain::{ConnectionService, ConnectionServiceSettings, RandomConnectionCodes};
    /// # use snapbeam::domain::ports::{ConnectionCommand, FixtureConnectionRepository, FixturePhotoStore};
    /// # async fn example() -> Result<(), snapbeam::domain::Error> {
    /// let service = ConnectionService::new(
    ///     Arc::new(FixtureConnectionRepository),
    ///     Arc::new(FixturePhotoStore),
    ///     Arc::new(DefaultClock),
    ///     Arc::new(RandomConnectionCodes::default()),
    ///     ConnectionServiceSettings::default(),
    /// );
    /// let record = service.create().await?;
    /// println!("share code {}", record.connection_id);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(
        connection_repo: Arc<R>,
        photo_store: Arc<P>,
        clock: Arc<dyn Clock>,
        codes: Arc<dyn ConnectionCodeSource>,
        settings: ConnectionServiceSettings,
    ) -> Self {
        Self {
            connection_repo,
            photo_store,
            clock,
            codes,
            settings,
        }
    }
}

impl<R, P> ConnectionService<R, P>
where
    R: ConnectionRepository + ?Sized,
    P: PhotoStore + ?Sized,
{
    fn map_repository_error(err: ConnectionRepositoryError) -> Error {
        error!(error = %err, "record store call failed");
        match err {
            ConnectionRepositoryError::Connection { message } => {
                Error::storage_unavailable(format!("record store unavailable: {message}"))
            }
            ConnectionRepositoryError::Query { message } => {
                Error::storage_unavailable(format!("record store error: {message}"))
            }
            ConnectionRepositoryError::Serialization { message } => {
                Error::internal(format!("stored connection record is corrupt: {message}"))
            }
        }
    }

    fn map_photo_path_error(err: &PhotoPathError) -> Error {
        Error::invalid_request("connection_id is invalid").with_details(json!({
            "field": "connection_id",
            "code": "invalid_connection_id",
            "reason": err.to_string(),
        }))
    }

    fn map_photo_store_error(err: PhotoStoreError) -> Error {
        error!(error = %err, "photo store call failed");
        Error::storage_unavailable(format!("photo store error: {err}"))
    }

    async fn find(&self, connection_id: &ConnectionId) -> Result<Option<ConnectionRecord>, Error> {
        self.connection_repo
            .find(connection_id)
            .await
            .map_err(Self::map_repository_error)
    }

    async fn find_existing(&self, connection_id: &ConnectionId) -> Result<ConnectionRecord, Error> {
        self.find(connection_id)
            .await?
            .ok_or_else(|| Error::not_found(CONNECTION_NOT_FOUND))
    }

    async fn save(&self, record: &ConnectionRecord) -> Result<(), Error> {
        self.connection_repo
            .save(record)
            .await
            .map_err(Self::map_repository_error)
    }
}

#[async_trait]
impl<R, P> ConnectionCommand for ConnectionService<R, P>
where
    R: ConnectionRepository + ?Sized,
    P: PhotoStore + ?Sized,
{
    async fn create(&self) -> Result<ConnectionRecord, Error> {
        let attempts = self.settings.create_attempts.max(1);
        for attempt in 1..=attempts {
            let candidate = self.codes.next_code();
            if self.find(&candidate).await?.is_some() {
                debug!(connection_id = %candidate, attempt, "connection code collision");
                continue;
            }

            let record = ConnectionRecord::new(candidate, self.clock.utc());
            self.save(&record).await?;
            info!(connection_id = %record.connection_id, "connection created");
            return Ok(record);
        }

        warn!(attempts, "exhausted connection code attempts");
        Err(Error::storage_unavailable(format!(
            "could not allocate a unique connection code after {attempts} attempts"
        )))
    }

    async fn update_photo(
        &self,
        request: UpdatePhotoRequest,
    ) -> Result<UpdatePhotoResponse, Error> {
        let UpdatePhotoRequest {
            connection_id,
            update,
        } = request;
        let mut record = self.find_existing(&connection_id).await?;

        record.apply(update, self.clock.utc());
        self.save(&record).await?;
        debug!(connection_id = %connection_id, state = ?record.state(), "photo updated");
        Ok(UpdatePhotoResponse {
            updated_at: record.updated_at,
        })
    }

    async fn upload_photo(&self, upload: PhotoUpload) -> Result<UploadPhotoResponse, Error> {
        let PhotoUpload {
            connection_id,
            bytes,
            content_type,
            filename,
        } = upload;
        if bytes.is_empty() {
            return Err(Error::invalid_request(UPLOAD_INCOMPLETE));
        }

        let now = self.clock.utc();
        let path = PhotoPath::for_upload(&connection_id, now, filename.as_deref())
            .map_err(|err| Self::map_photo_path_error(&err))?;
        let photo = StoredPhoto {
            content_type: content_type
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PHOTO_CONTENT_TYPE.to_owned()),
            bytes,
        };
        self.photo_store
            .put(&path, &photo)
            .await
            .map_err(Self::map_photo_store_error)?;

        let photo_url = self.settings.public_photo_base.locator_for(&path);
        let mut record = match self.find(&connection_id).await? {
            Some(record) => record,
            None => {
                info!(connection_id = %connection_id, "creating connection on first upload");
                ConnectionRecord::new(connection_id.clone(), now)
            }
        };
        record.apply(PhotoUpdate::with_photo_url(photo_url.clone()), now);
        self.save(&record).await?;

        info!(
            connection_id = %connection_id,
            path = %path,
            size = photo.bytes.len(),
            "photo uploaded"
        );
        Ok(UploadPhotoResponse { photo_url })
    }

    async fn delete(&self, connection_id: &ConnectionId) -> Result<(), Error> {
        self.connection_repo
            .delete(connection_id)
            .await
            .map_err(Self::map_repository_error)?;
        info!(connection_id = %connection_id, "connection deleted");
        Ok(())
    }
}

#[async_trait]
impl<R, P> ConnectionQuery for ConnectionService<R, P>
where
    R: ConnectionRepository + ?Sized,
    P: PhotoStore + ?Sized,
{
    async fn latest(&self, connection_id: &ConnectionId) -> Result<ConnectionRecord, Error> {
        self.find_existing(connection_id).await
    }

    async fn fetch_photo(&self, path: &PhotoPath) -> Result<StoredPhoto, Error> {
        self.photo_store
            .get(path)
            .await
            .map_err(Self::map_photo_store_error)?
            .ok_or_else(|| Error::not_found("Photo not found"))
    }
}

#[cfg(test)]
#[path = "connection_service_tests.rs"]
mod tests;
