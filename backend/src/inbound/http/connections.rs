//! Connection lifecycle HTTP handlers.
//!
//! ```text
//! POST /create
//! POST /update
//! GET  /latest?connection_id=
//! POST /delete
//! ```
//!
//! Field names are snake_case on the wire; existing mobile and widget
//! clients depend on them.

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::UpdatePhotoRequest;
use crate::domain::{CaptionUpdate, ConnectionRecord, PhotoUpdate};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    CONNECTION_ID_PARAMETER_REQUIRED, CONNECTION_ID_REQUIRED, require_connection_id,
};

/// Render a timestamp the way clients parse it: RFC 3339, milliseconds, `Z`.
pub(crate) fn iso8601(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Distinguish an absent member (`None`) from an explicit `null`
/// (`Some(None)`).
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Response for `POST /create`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateConnectionResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "AB3D9F2K")]
    pub connection_id: String,
    #[schema(example = "Connection created successfully")]
    pub message: String,
}

/// Request payload for `POST /update`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdatePhotoBody {
    #[serde(default)]
    #[schema(example = "AB3D9F2K")]
    pub connection_id: Option<String>,
    /// Blob-store locator of the new photo.
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Inline encoded image payload.
    #[serde(default)]
    pub photo_base64: Option<String>,
    /// New caption; `""` or `null` clears it, absence keeps it.
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub caption: Option<Option<String>>,
}

/// Response for `POST /update`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatePhotoResponseBody {
    pub success: bool,
    #[schema(example = "Photo updated successfully")]
    pub message: String,
    #[schema(example = "2025-03-01T09:30:00.000Z")]
    pub updated_at: String,
}

/// Query parameters for `GET /latest`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LatestQuery {
    /// Connection to read.
    pub connection_id: Option<String>,
}

/// Response for `GET /latest`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LatestPhotoResponse {
    pub success: bool,
    pub connection_id: String,
    pub last_photo_url: Option<String>,
    pub last_photo_base64: Option<String>,
    pub last_caption: Option<String>,
    #[schema(example = "2025-03-01T09:30:00.000Z")]
    pub updated_at: String,
}

impl From<ConnectionRecord> for LatestPhotoResponse {
    fn from(record: ConnectionRecord) -> Self {
        Self {
            success: true,
            connection_id: record.connection_id.into(),
            last_photo_url: record.last_photo_url,
            last_photo_base64: record.last_photo_base64,
            last_caption: record.last_caption,
            updated_at: iso8601(record.updated_at),
        }
    }
}

/// Request payload for `POST /delete`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DeleteConnectionBody {
    #[serde(default)]
    pub connection_id: Option<String>,
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Create a connection and return its shareable code.
#[utoipa::path(
    post,
    path = "/create",
    responses(
        (status = 200, description = "Connection created", body = CreateConnectionResponse),
        (status = 500, description = "Record store failure", body = ErrorSchema)
    ),
    tags = ["connections"],
    operation_id = "createConnection"
)]
#[post("/create")]
pub async fn create_connection(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let record = state.connections.create().await?;
    Ok(HttpResponse::Ok().json(CreateConnectionResponse {
        success: true,
        connection_id: record.connection_id.into(),
        message: "Connection created successfully".to_owned(),
    }))
}

/// Replace the shared photo and/or caption of a connection.
#[utoipa::path(
    post,
    path = "/update",
    request_body = UpdatePhotoBody,
    responses(
        (status = 200, description = "Photo updated", body = UpdatePhotoResponseBody),
        (status = 400, description = "Missing connection id", body = ErrorSchema),
        (status = 404, description = "Unknown connection", body = ErrorSchema),
        (status = 500, description = "Record store failure", body = ErrorSchema)
    ),
    tags = ["connections"],
    operation_id = "updatePhoto"
)]
#[post("/update")]
pub async fn update_photo(
    state: web::Data<HttpState>,
    payload: web::Json<UpdatePhotoBody>,
) -> ApiResult<HttpResponse> {
    let UpdatePhotoBody {
        connection_id,
        photo_url,
        photo_base64,
        caption,
    } = payload.into_inner();
    let connection_id = require_connection_id(connection_id.as_deref(), CONNECTION_ID_REQUIRED)?;

    let response = state
        .connections
        .update_photo(UpdatePhotoRequest {
            connection_id,
            update: PhotoUpdate {
                photo_url,
                photo_base64,
                caption: CaptionUpdate::from_request(caption),
            },
        })
        .await?;

    Ok(HttpResponse::Ok().json(UpdatePhotoResponseBody {
        success: true,
        message: "Photo updated successfully".to_owned(),
        updated_at: iso8601(response.updated_at),
    }))
}

/// Read the latest photo and caption of a connection.
#[utoipa::path(
    get,
    path = "/latest",
    params(LatestQuery),
    responses(
        (status = 200, description = "Latest photo", body = LatestPhotoResponse),
        (status = 400, description = "Missing connection id", body = ErrorSchema),
        (status = 404, description = "Unknown connection", body = ErrorSchema),
        (status = 500, description = "Record store failure", body = ErrorSchema)
    ),
    tags = ["connections"],
    operation_id = "getLatestPhoto"
)]
#[get("/latest")]
pub async fn get_latest(
    state: web::Data<HttpState>,
    query: web::Query<LatestQuery>,
) -> ApiResult<HttpResponse> {
    let connection_id = require_connection_id(
        query.connection_id.as_deref(),
        CONNECTION_ID_PARAMETER_REQUIRED,
    )?;
    let record = state.connections_query.latest(&connection_id).await?;
    Ok(HttpResponse::Ok().json(LatestPhotoResponse::from(record)))
}

/// Delete a connection. Unknown connections are acknowledged too.
#[utoipa::path(
    post,
    path = "/delete",
    request_body = DeleteConnectionBody,
    responses(
        (status = 200, description = "Connection deleted", body = MessageResponse),
        (status = 400, description = "Missing connection id", body = ErrorSchema),
        (status = 500, description = "Record store failure", body = ErrorSchema)
    ),
    tags = ["connections"],
    operation_id = "deleteConnection"
)]
#[post("/delete")]
pub async fn delete_connection(
    state: web::Data<HttpState>,
    payload: web::Json<DeleteConnectionBody>,
) -> ApiResult<HttpResponse> {
    let connection_id =
        require_connection_id(payload.connection_id.as_deref(), CONNECTION_ID_REQUIRED)?;
    state.connections.delete(&connection_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::ok("Connection deleted successfully")))
}

#[cfg(test)]
#[path = "connections_tests.rs"]
mod tests;
