//! Filesystem photo store rooted at a capability directory.
//!
//! Blobs live at `{root}/{connection_id}/{millis}.{ext}` with the content type
//! in a `.content-type` sidecar next to them. Writes go to a hidden temporary
//! file first and are renamed into place, so readers never observe a partial
//! photo. All I/O runs on the blocking pool.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use cap_std::{ambient_authority, fs::Dir};
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{PhotoStore, PhotoStoreError};
use crate::domain::{DEFAULT_PHOTO_CONTENT_TYPE, PhotoPath, StoredPhoto};

const CONTENT_TYPE_SUFFIX: &str = ".content-type";

/// [`PhotoStore`] writing blobs below a root directory.
#[derive(Debug, Clone)]
pub struct FilesystemPhotoStore {
    root: Arc<Dir>,
}

impl FilesystemPhotoStore {
    /// Open (creating if needed) the root directory.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoStoreError::Io`] when the directory cannot be created
    /// or opened.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, PhotoStoreError> {
        let root = root.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority())
            .map_err(|err| io_error(root, &err))?;
        let dir =
            Dir::open_ambient_dir(root, ambient_authority()).map_err(|err| io_error(root, &err))?;
        Ok(Self::from_dir(dir))
    }

    /// Wrap an already opened directory.
    #[must_use]
    pub fn from_dir(dir: Dir) -> Self {
        Self {
            root: Arc::new(dir),
        }
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, PhotoStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, PhotoStoreError> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || op(&root))
            .await
            .map_err(|err| PhotoStoreError::unavailable(format!("blocking task failed: {err}")))?
    }
}

fn io_error(path: impl AsRef<Path>, err: &io::Error) -> PhotoStoreError {
    PhotoStoreError::io(path.as_ref().display().to_string(), err.to_string())
}

fn sidecar_name(file_name: &str) -> String {
    format!("{file_name}{CONTENT_TYPE_SUFFIX}")
}

fn write_replacing(dir: &Dir, relative: &Path, contents: &[u8]) -> io::Result<()> {
    let file_name = relative
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staging = relative.with_file_name(format!(".{file_name}.tmp.{}", Uuid::new_v4().simple()));
    dir.write(&staging, contents)?;
    dir.rename(&staging, dir, relative).inspect_err(|_| {
        if let Err(err) = dir.remove_file(&staging) {
            warn!(staging = %staging.display(), error = %err, "failed to remove staging file");
        }
    })
}

fn read_optional(dir: &Dir, relative: &Path) -> io::Result<Option<Vec<u8>>> {
    match dir.read(relative) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

#[async_trait]
impl PhotoStore for FilesystemPhotoStore {
    async fn put(&self, path: &PhotoPath, photo: &StoredPhoto) -> Result<(), PhotoStoreError> {
        let display = path.to_string();
        let folder = PathBuf::from(path.connection_id().as_str());
        let blob = folder.join(path.file_name());
        let sidecar = folder.join(sidecar_name(path.file_name()));
        let photo = photo.clone();

        self.blocking(move |dir| {
            dir.create_dir_all(&folder)
                .map_err(|err| io_error(&folder, &err))?;
            write_replacing(dir, &sidecar, photo.content_type.as_bytes())
                .map_err(|err| io_error(&display, &err))?;
            write_replacing(dir, &blob, &photo.bytes).map_err(|err| io_error(&display, &err))
        })
        .await
    }

    async fn get(&self, path: &PhotoPath) -> Result<Option<StoredPhoto>, PhotoStoreError> {
        let display = path.to_string();
        let folder = PathBuf::from(path.connection_id().as_str());
        let blob = folder.join(path.file_name());
        let sidecar = folder.join(sidecar_name(path.file_name()));

        self.blocking(move |dir| {
            let Some(bytes) = read_optional(dir, &blob).map_err(|err| io_error(&display, &err))?
            else {
                return Ok(None);
            };
            let content_type = read_optional(dir, &sidecar)
                .map_err(|err| io_error(&display, &err))?
                .map(|raw| String::from_utf8_lossy(&raw).trim().to_owned())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_PHOTO_CONTENT_TYPE.to_owned());
            Ok(Some(StoredPhoto {
                content_type,
                bytes: Bytes::from(bytes),
            }))
        })
        .await
    }
}
