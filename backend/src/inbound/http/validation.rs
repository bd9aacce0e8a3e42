//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{ConnectionId, Error};

/// Message for a body lacking `connection_id`.
pub const CONNECTION_ID_REQUIRED: &str = "connection_id is required";

/// Message for a query string lacking `connection_id`.
pub const CONNECTION_ID_PARAMETER_REQUIRED: &str = "connection_id parameter is required";

fn missing_connection_id(message: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": "connection_id",
        "code": "missing_field",
    }))
}

/// Parse a client-supplied connection id.
///
/// Any non-blank value names a connection; a missing or blank value yields
/// `missing_message`. Path safety is only enforced where the id names a blob
/// directory.
pub(crate) fn require_connection_id(
    raw: Option<&str>,
    missing_message: &str,
) -> Result<ConnectionId, Error> {
    raw.ok_or_else(|| missing_connection_id(missing_message))
        .and_then(|value| {
            ConnectionId::new(value).map_err(|_| missing_connection_id(missing_message))
        })
}
