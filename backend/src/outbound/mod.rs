//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **record_store**: connection records in memory or in Redis
//! - **photo_store**: uploaded photo blobs in memory or on the filesystem
//!
//! Adapters are thin translators between domain types and storage
//! representations. They contain no business logic.

pub mod photo_store;
pub mod record_store;
