//! Builders wiring store adapters into the HTTP handler state.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use snapbeam::domain::ports::{
    ConnectionRepository, ConnectionRepositoryError, PhotoStore, PhotoStoreError,
};
use snapbeam::domain::{ConnectionService, RandomConnectionCodes};
use snapbeam::inbound::http::state::HttpState;
use snapbeam::outbound::photo_store::{FilesystemPhotoStore, InMemoryPhotoStore};
use snapbeam::outbound::record_store::{InMemoryConnectionRepository, RedisConnectionRepository};

use super::ServerConfig;

/// Failures while opening the configured stores.
#[derive(Debug, thiserror::Error)]
pub enum StateBuildError {
    #[error("failed to open record store: {0}")]
    RecordStore(#[from] ConnectionRepositoryError),
    #[error("failed to open photo store: {0}")]
    PhotoStore(#[from] PhotoStoreError),
}

async fn build_record_store(
    config: &ServerConfig,
) -> Result<Arc<dyn ConnectionRepository>, ConnectionRepositoryError> {
    match config.redis_pool() {
        Some(pool) => {
            let repo = RedisConnectionRepository::connect(pool).await?;
            info!("record store: redis");
            Ok(Arc::new(repo))
        }
        None => {
            warn!("record store: in-memory; connections are lost on restart");
            Ok(Arc::new(InMemoryConnectionRepository::new()))
        }
    }
}

fn build_photo_store(config: &ServerConfig) -> Result<Arc<dyn PhotoStore>, PhotoStoreError> {
    match &config.blob_dir {
        Some(dir) => {
            let store = FilesystemPhotoStore::open(dir)?;
            info!(root = %dir.display(), "photo store: filesystem");
            Ok(Arc::new(store))
        }
        None => {
            warn!("photo store: in-memory; photos are lost on restart");
            Ok(Arc::new(InMemoryPhotoStore::new()))
        }
    }
}

/// Assemble the connection service over the configured stores.
pub async fn build_http_state(
    config: &ServerConfig,
) -> Result<web::Data<HttpState>, StateBuildError> {
    let record_store = build_record_store(config).await?;
    let photo_store = build_photo_store(config)?;
    let service = Arc::new(ConnectionService::new(
        record_store,
        photo_store,
        Arc::new(DefaultClock),
        Arc::new(RandomConnectionCodes::new(config.code_length)),
        config.service_settings(),
    ));

    Ok(web::Data::new(
        HttpState::new(service.clone(), service).with_max_upload_bytes(config.max_upload_bytes),
    ))
}
