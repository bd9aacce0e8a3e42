//! Multipart photo upload handler.
//!
//! ```text
//! POST /upload   (multipart/form-data: photo, connection_id)
//! ```
//!
//! The whole photo is buffered in memory before it reaches the domain, capped
//! at the configured upload limit.

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{HttpResponse, post, web};
use bytes::BytesMut;
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Error, PhotoUpload, UPLOAD_INCOMPLETE};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::require_connection_id;

const CONNECTION_ID_FIELD_LIMIT: usize = 1024;

/// Multipart form accepted by `POST /upload`.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UploadForm {
    /// Image file; its filename suffix picks the stored extension.
    #[schema(value_type = String, format = Binary)]
    photo: Vec<u8>,
    /// Target connection; created when it does not exist yet.
    #[schema(example = "AB3D9F2K")]
    connection_id: String,
}

/// Response for `POST /upload`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadPhotoResponseBody {
    pub success: bool,
    #[schema(example = "http://localhost:8080/photos/AB3D9F2K/1712345678901.png")]
    pub photo_url: String,
    #[schema(example = "Photo uploaded successfully")]
    pub message: String,
}

#[derive(Debug)]
struct PhotoPart {
    bytes: BytesMut,
    content_type: Option<String>,
    filename: Option<String>,
}

fn multipart_error(err: MultipartError) -> Error {
    Error::invalid_request("Invalid multipart body").with_details(json!({
        "code": "invalid_multipart",
        "reason": err.to_string(),
    }))
}

fn too_large(field: &str, limit: usize) -> Error {
    Error::invalid_request(format!("{field} exceeds the upload limit")).with_details(json!({
        "field": field,
        "code": "payload_too_large",
        "limit": limit,
    }))
}

async fn read_field(field: &mut Field, name: &str, limit: usize) -> Result<BytesMut, Error> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        if buffer.len() + chunk.len() > limit {
            return Err(too_large(name, limit));
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}

/// Upload a photo and make it the connection's latest photo.
#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Photo stored", body = UploadPhotoResponseBody),
        (status = 400, description = "Missing file or connection id, or file too large", body = ErrorSchema),
        (status = 500, description = "Blob or record store failure", body = ErrorSchema)
    ),
    tags = ["photos"],
    operation_id = "uploadPhoto"
)]
#[post("/upload")]
pub async fn upload_photo(
    state: web::Data<HttpState>,
    mut payload: Multipart,
) -> ApiResult<HttpResponse> {
    let mut photo: Option<PhotoPart> = None;
    let mut connection_id: Option<String> = None;

    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "photo" => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .map(str::to_owned);
                let content_type = field.content_type().map(ToString::to_string);
                let bytes = read_field(&mut field, "photo", state.max_upload_bytes).await?;
                photo = Some(PhotoPart {
                    bytes,
                    content_type,
                    filename,
                });
            }
            "connection_id" => {
                let raw = read_field(&mut field, "connection_id", CONNECTION_ID_FIELD_LIMIT).await?;
                connection_id = Some(String::from_utf8_lossy(&raw).into_owned());
            }
            _ => {
                read_field(&mut field, &name, state.max_upload_bytes).await?;
            }
        }
    }

    let Some(photo) = photo else {
        return Err(Error::invalid_request(UPLOAD_INCOMPLETE));
    };
    let connection_id = require_connection_id(connection_id.as_deref(), UPLOAD_INCOMPLETE)?;

    let response = state
        .connections
        .upload_photo(PhotoUpload {
            connection_id,
            bytes: photo.bytes.freeze(),
            content_type: photo.content_type,
            filename: photo.filename,
        })
        .await?;

    Ok(HttpResponse::Ok().json(UploadPhotoResponseBody {
        success: true,
        photo_url: response.photo_url,
        message: "Photo uploaded successfully".to_owned(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::Value;

    use crate::domain::ports::{MockConnectionCommand, UploadPhotoResponse};
    use crate::inbound::http::test_utils::state_with_command;

    const BOUNDARY: &str = "snapbeam-test-boundary";

    fn multipart_body(parts: &[(&str, Option<&str>, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, filename, content_type, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let disposition = match filename {
                Some(filename) => {
                    format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n")
                }
                None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n"),
            };
            body.extend_from_slice(disposition.as_bytes());
            if let Some(content_type) = content_type {
                body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
            }
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn send(state: web::Data<HttpState>, body: Vec<u8>) -> (StatusCode, Value) {
        let app = test::init_service(App::new().app_data(state).service(upload_photo)).await;
        let req = test::TestRequest::post()
            .uri("/upload")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
            .to_request();
        let res = test::call_service(&app, req).await;
        let status = res.status();
        (status, test::read_body_json(res).await)
    }

    #[actix_web::test]
    async fn forwards_file_metadata_to_the_domain() {
        let mut command = MockConnectionCommand::new();
        command
            .expect_upload_photo()
            .withf(|upload| {
                upload.connection_id.as_str() == "AB3D9F2K"
                    && upload.bytes.as_ref() == b"\x89PNG"
                    && upload.content_type.as_deref() == Some("image/png")
                    && upload.filename.as_deref() == Some("a.png")
            })
            .times(1)
            .returning(|_| {
                Ok(UploadPhotoResponse {
                    photo_url: "http://localhost:8080/photos/AB3D9F2K/1.png".to_owned(),
                })
            });

        let body = multipart_body(&[
            ("connection_id", None, None, b"AB3D9F2K"),
            ("photo", Some("a.png"), Some("image/png"), b"\x89PNG"),
        ]);
        let (status, json) = send(state_with_command(command), body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["photo_url"], "http://localhost:8080/photos/AB3D9F2K/1.png");
        assert_eq!(json["message"], "Photo uploaded successfully");
    }

    #[actix_web::test]
    async fn missing_photo_is_rejected() {
        let mut command = MockConnectionCommand::new();
        command.expect_upload_photo().times(0);

        let body = multipart_body(&[("connection_id", None, None, b"AB3D9F2K")]);
        let (status, json) = send(state_with_command(command), body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], UPLOAD_INCOMPLETE);
    }

    #[actix_web::test]
    async fn missing_connection_id_is_rejected() {
        let mut command = MockConnectionCommand::new();
        command.expect_upload_photo().times(0);

        let body = multipart_body(&[("photo", Some("a.png"), Some("image/png"), b"png")]);
        let (status, json) = send(state_with_command(command), body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], UPLOAD_INCOMPLETE);
    }

    #[actix_web::test]
    async fn oversized_photos_are_rejected() {
        let mut command = MockConnectionCommand::new();
        command.expect_upload_photo().times(0);
        let state = web::Data::new(
            state_with_command(command)
                .get_ref()
                .clone()
                .with_max_upload_bytes(4),
        );

        let body = multipart_body(&[
            ("connection_id", None, None, b"AB3D9F2K"),
            ("photo", Some("a.jpg"), Some("image/jpeg"), b"0123456789"),
        ]);
        let (status, json) = send(state, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["details"]["code"], "payload_too_large");
    }
}
