//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports ([`ConnectionRepository`], [`PhotoStore`]) describe the
//! storage the domain relies on; adapters map their failures into the typed
//! errors declared here. Driving ports ([`ConnectionCommand`],
//! [`ConnectionQuery`]) are what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod connection_command;
mod connection_query;
mod connection_repository;
mod photo_store;

#[cfg(test)]
pub use connection_command::MockConnectionCommand;
pub use connection_command::{
    ConnectionCommand, FixtureConnectionCommand, UpdatePhotoRequest, UpdatePhotoResponse,
    UploadPhotoResponse,
};
#[cfg(test)]
pub use connection_query::MockConnectionQuery;
pub use connection_query::{ConnectionQuery, FixtureConnectionQuery};
#[cfg(test)]
pub use connection_repository::MockConnectionRepository;
pub use connection_repository::{
    ConnectionRepository, ConnectionRepositoryError, FixtureConnectionRepository,
};
#[cfg(test)]
pub use photo_store::MockPhotoStore;
pub use photo_store::{FixturePhotoStore, PhotoStore, PhotoStoreError};
