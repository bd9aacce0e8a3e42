//! Public photo download handler.
//!
//! ```text
//! GET /photos/{connection_id}/{file_name}
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, get, web};

use crate::domain::{Error, PhotoPath};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Stored photo paths embed a timestamp, so their bytes never change.
pub const IMMUTABLE_PHOTO_CACHE: &str = "public, max-age=31536000, immutable";

/// Serve the bytes of an uploaded photo with its recorded content type.
#[utoipa::path(
    get,
    path = "/photos/{connection_id}/{file_name}",
    params(
        ("connection_id" = String, Path, description = "Owning connection"),
        ("file_name" = String, Path, description = "`{unix_millis}.{ext}` as issued by the upload")
    ),
    responses(
        (status = 200, description = "Photo bytes", content_type = "application/octet-stream"),
        (status = 404, description = "Unknown photo", body = ErrorSchema),
        (status = 500, description = "Photo store failure", body = ErrorSchema)
    ),
    tags = ["photos"],
    operation_id = "getPhoto"
)]
#[get("/photos/{connection_id}/{file_name}")]
pub async fn get_photo(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (connection_id, file_name) = path.into_inner();
    let photo_path = PhotoPath::parse(&format!("{connection_id}/{file_name}"))
        .map_err(|_| Error::not_found("Photo not found"))?;

    let photo = state.connections_query.fetch_photo(&photo_path).await?;
    Ok(HttpResponse::Ok()
        .content_type(photo.content_type)
        .insert_header((header::CACHE_CONTROL, IMMUTABLE_PHOTO_CACHE))
        .body(photo.bytes))
}
