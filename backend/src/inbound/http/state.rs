//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ConnectionCommand, ConnectionQuery, FixtureConnectionCommand, FixtureConnectionQuery,
};

/// Default cap on uploaded photo size and JSON request bodies.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub connections: Arc<dyn ConnectionCommand>,
    pub connections_query: Arc<dyn ConnectionQuery>,
    pub max_upload_bytes: usize,
}

impl HttpState {
    /// Construct state from the connection ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use snapbeam::domain::ports::{FixtureConnectionCommand, FixtureConnectionQuery};
    /// use snapbeam::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(FixtureConnectionCommand),
    ///     Arc::new(FixtureConnectionQuery),
    /// );
    /// assert_eq!(state.max_upload_bytes, 10 * 1024 * 1024);
    /// ```
    pub fn new(
        connections: Arc<dyn ConnectionCommand>,
        connections_query: Arc<dyn ConnectionQuery>,
    ) -> Self {
        Self {
            connections,
            connections_query,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Override the upload size cap.
    #[must_use]
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

impl Default for HttpState {
    fn default() -> Self {
        Self::new(
            Arc::new(FixtureConnectionCommand),
            Arc::new(FixtureConnectionQuery),
        )
    }
}
