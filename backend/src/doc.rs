//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every SnapBeam endpoint from the inbound HTTP layer
//! together with the error schema wrappers from
//! [`crate::inbound::http::schemas`]. The document backs Swagger UI in debug
//! builds and is printed by `cargo run --bin openapi-dump`.

use utoipa::OpenApi;

use crate::inbound::http::connections::{
    CreateConnectionResponse, DeleteConnectionBody, LatestPhotoResponse, MessageResponse,
    UpdatePhotoBody, UpdatePhotoResponseBody,
};
use crate::inbound::http::health::HealthResponse;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::upload::{UploadForm, UploadPhotoResponseBody};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SnapBeam API",
        description = "Pair two devices with a short code and share the latest photo and caption between them."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::connections::create_connection,
        crate::inbound::http::connections::update_photo,
        crate::inbound::http::connections::get_latest,
        crate::inbound::http::connections::delete_connection,
        crate::inbound::http::upload::upload_photo,
        crate::inbound::http::photos::get_photo,
        crate::inbound::http::health::health,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CreateConnectionResponse,
        UpdatePhotoBody,
        UpdatePhotoResponseBody,
        LatestPhotoResponse,
        DeleteConnectionBody,
        MessageResponse,
        UploadForm,
        UploadPhotoResponseBody,
        HealthResponse,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "connections", description = "Connection lifecycle and latest photo"),
        (name = "photos", description = "Photo upload and download"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
