//! HTTP inbound adapter exposing the SnapBeam REST endpoints.
//!
//! Handlers translate requests into connection port calls and map domain
//! errors onto JSON error bodies. [`configure`] registers every route so the
//! server and integration tests build identical apps.

pub mod connections;
pub mod error;
pub mod health;
pub mod photos;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod upload;
pub mod validation;

use actix_web::{HttpResponse, web};
use serde_json::json;

pub use error::ApiResult;

use crate::domain::Error;

/// JSON extractor settings: lenient about `Content-Type`, strict about syntax.
///
/// Malformed bodies become `400 {"error": "Invalid JSON body"}` rather than
/// actix's plain-text rejection.
#[must_use]
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .content_type_required(false)
        .error_handler(|err, _req| {
            Error::invalid_request("Invalid JSON body")
                .with_details(json!({ "reason": err.to_string() }))
                .into()
        })
}

/// Query extractor settings matching [`json_config`]'s error shape.
#[must_use]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        Error::invalid_request("Invalid query string")
            .with_details(json!({ "reason": err.to_string() }))
            .into()
    })
}

/// Fallback for unmatched paths and methods.
pub async fn not_found() -> ApiResult<HttpResponse> {
    Err(Error::not_found("Not found"))
}

/// Register every SnapBeam route on `cfg`.
///
/// Callers supply the [`state::HttpState`] and
/// [`health::HealthState`] app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(connections::create_connection)
        .service(connections::update_photo)
        .service(connections::get_latest)
        .service(connections::delete_connection)
        .service(upload::upload_photo)
        .service(photos::get_photo)
        .service(web::resource("/health").to(health::health))
        .service(health::ready)
        .service(health::live);
}
