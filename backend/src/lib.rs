//! SnapBeam backend library: pairing connections and latest-photo sharing.
//!
//! The crate follows a hexagonal layout. [`domain`] owns the connection model
//! and its ports, [`outbound`] implements the record and photo stores, and
//! [`inbound::http`] exposes the REST surface.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::{Cors, Trace};
