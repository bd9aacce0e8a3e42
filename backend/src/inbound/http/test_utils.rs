//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    ConnectionCommand, ConnectionQuery, FixtureConnectionCommand, FixtureConnectionQuery,
};
use crate::inbound::http::state::HttpState;

/// Wrap a command port in handler state, pairing it with the fixture query.
pub fn state_with_command(command: impl ConnectionCommand + 'static) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        Arc::new(command),
        Arc::new(FixtureConnectionQuery),
    ))
}

/// Wrap a query port in handler state, pairing it with the fixture command.
pub fn state_with_query(query: impl ConnectionQuery + 'static) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        Arc::new(FixtureConnectionCommand),
        Arc::new(query),
    ))
}
