//! Blob store adapters implementing [`PhotoStore`].
//!
//! [`PhotoStore`]: crate::domain::ports::PhotoStore

mod filesystem;
mod memory;

pub use self::filesystem::FilesystemPhotoStore;
pub use self::memory::InMemoryPhotoStore;
