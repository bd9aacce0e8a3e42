//! Tests for the connection lifecycle handlers.

use actix_web::http::StatusCode;
use actix_web::{App, test};
use chrono::TimeZone;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{MockConnectionCommand, MockConnectionQuery, UpdatePhotoResponse};
use crate::domain::{ConnectionId, Error};
use crate::inbound::http::json_config;
use crate::inbound::http::test_utils::{state_with_command, state_with_query};

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

fn record(id: &str) -> ConnectionRecord {
    ConnectionRecord::new(ConnectionId::new(id).expect("id"), fixed_time())
}

async fn post_json(state: web::Data<HttpState>, uri: &str, body: Value) -> (StatusCode, Value) {
    let app = test::init_service(
        App::new()
            .app_data(state)
            .app_data(json_config(1024))
            .service(create_connection)
            .service(update_photo)
            .service(delete_connection),
    )
    .await;
    let req = test::TestRequest::post().uri(uri).set_json(body).to_request();
    let res = test::call_service(&app, req).await;
    let status = res.status();
    (status, test::read_body_json(res).await)
}

async fn get_latest_for(state: web::Data<HttpState>, uri: &str) -> (StatusCode, Value) {
    let app = test::init_service(App::new().app_data(state).service(get_latest)).await;
    let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    let status = res.status();
    (status, test::read_body_json(res).await)
}

#[actix_web::test]
async fn create_returns_the_new_code() {
    let mut command = MockConnectionCommand::new();
    command
        .expect_create()
        .times(1)
        .returning(|| Ok(record("AB3D9F2K")));

    let (status, body) = post_json(state_with_command(command), "/create", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "connection_id": "AB3D9F2K",
            "message": "Connection created successfully",
        })
    );
}

#[actix_web::test]
async fn create_redacts_store_failures() {
    let mut command = MockConnectionCommand::new();
    command
        .expect_create()
        .returning(|| Err(Error::storage_unavailable("redis refused")));

    let (status, body) = post_json(state_with_command(command), "/create", json!({})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[actix_web::test]
async fn update_without_connection_id_is_rejected() {
    let mut command = MockConnectionCommand::new();
    command.expect_update_photo().times(0);

    let (status, body) = post_json(state_with_command(command), "/update", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "connection_id is required");
}

#[rstest]
#[case(json!({"connection_id": "AB3D9F2K", "caption": "hi"}), CaptionUpdate::Set("hi".to_owned()))]
#[case(json!({"connection_id": "AB3D9F2K", "caption": ""}), CaptionUpdate::Clear)]
#[case(json!({"connection_id": "AB3D9F2K", "caption": null}), CaptionUpdate::Clear)]
#[case(json!({"connection_id": "AB3D9F2K", "photo_url": "https://cdn/p.jpg"}), CaptionUpdate::Keep)]
#[actix_rt::test]
async fn update_translates_caption_semantics(
    #[case] body: Value,
    #[case] expected: CaptionUpdate,
) {
    let mut command = MockConnectionCommand::new();
    command
        .expect_update_photo()
        .withf(move |request| {
            request.connection_id.as_str() == "AB3D9F2K" && request.update.caption == expected
        })
        .times(1)
        .returning(|_| {
            Ok(UpdatePhotoResponse {
                updated_at: fixed_time(),
            })
        });

    let (status, body) = post_json(state_with_command(command), "/update", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Photo updated successfully");
    assert_eq!(body["updated_at"], "2025-03-01T09:30:00.000Z");
}

#[actix_web::test]
async fn update_reports_unknown_connections() {
    let mut command = MockConnectionCommand::new();
    command
        .expect_update_photo()
        .returning(|_| Err(Error::not_found("Connection not found")));

    let (status, body) = post_json(
        state_with_command(command),
        "/update",
        json!({"connection_id": "ZZZZZZZZ", "photo_url": "https://cdn/p.jpg"}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Connection not found");
}

#[actix_web::test]
async fn update_rejects_malformed_json() {
    let app = test::init_service(
        App::new()
            .app_data(state_with_command(MockConnectionCommand::new()))
            .app_data(json_config(1024))
            .service(update_photo),
    )
    .await;
    let req = test::TestRequest::post()
        .uri("/update")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"connection_id\":")
        .to_request();

    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn latest_requires_the_query_parameter() {
    let mut query = MockConnectionQuery::new();
    query.expect_latest().times(0);

    let (status, body) = get_latest_for(state_with_query(query), "/latest").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "connection_id parameter is required");
}

#[actix_web::test]
async fn latest_renders_absent_fields_as_null() {
    let mut stored = record("AB3D9F2K");
    stored.last_caption = Some("hi".to_owned());
    let mut query = MockConnectionQuery::new();
    query
        .expect_latest()
        .withf(|id| id.as_str() == "AB3D9F2K")
        .return_once(move |_| Ok(stored));

    let (status, body) =
        get_latest_for(state_with_query(query), "/latest?connection_id=AB3D9F2K").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "connection_id": "AB3D9F2K",
            "last_photo_url": null,
            "last_photo_base64": null,
            "last_caption": "hi",
            "updated_at": "2025-03-01T09:30:00.000Z",
        })
    );
}

#[actix_web::test]
async fn delete_acknowledges() {
    let mut command = MockConnectionCommand::new();
    command
        .expect_delete()
        .withf(|id| id.as_str() == "AB3D9F2K")
        .times(1)
        .returning(|_| Ok(()));

    let (status, body) = post_json(
        state_with_command(command),
        "/delete",
        json!({"connection_id": "AB3D9F2K"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "message": "Connection deleted successfully"})
    );
}

#[actix_web::test]
async fn delete_without_connection_id_is_rejected() {
    let (status, body) = post_json(
        state_with_command(MockConnectionCommand::new()),
        "/delete",
        json!({"connection_id": "  "}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "connection_id is required");
}
