//! Tests for the connection service.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockConnectionRepository, MockPhotoStore};
use crate::domain::{CaptionUpdate, ErrorCode, MockConnectionCodeSource};

const PHOTO_BASE: &str = "https://photos.example.com";

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(1_712_345_678_901)
        .single()
        .expect("valid timestamp")
}

fn id(raw: &str) -> ConnectionId {
    ConnectionId::new(raw).expect("valid connection id")
}

fn codes_yielding(sequence: &[&'static str]) -> MockConnectionCodeSource {
    let mut queue = sequence.to_vec().into_iter();
    let mut codes = MockConnectionCodeSource::new();
    codes
        .expect_next_code()
        .times(sequence.len())
        .returning(move || id(queue.next().expect("code available")));
    codes
}

fn make_service_with(
    repo: MockConnectionRepository,
    photos: MockPhotoStore,
    codes: MockConnectionCodeSource,
    now: DateTime<Utc>,
    create_attempts: u32,
) -> ConnectionService<MockConnectionRepository, MockPhotoStore> {
    ConnectionService::new(
        Arc::new(repo),
        Arc::new(photos),
        Arc::new(FixtureClock { utc_now: now }),
        Arc::new(codes),
        ConnectionServiceSettings {
            create_attempts,
            public_photo_base: PublicPhotoBase::new(PHOTO_BASE),
        },
    )
}

fn make_service(
    repo: MockConnectionRepository,
    photos: MockPhotoStore,
    now: DateTime<Utc>,
) -> ConnectionService<MockConnectionRepository, MockPhotoStore> {
    make_service_with(repo, photos, MockConnectionCodeSource::new(), now, 5)
}

fn upload(bytes: &'static [u8], content_type: Option<&str>, filename: Option<&str>) -> PhotoUpload {
    PhotoUpload {
        connection_id: id("AB3D9F2K"),
        bytes: Bytes::from_static(bytes),
        content_type: content_type.map(str::to_owned),
        filename: filename.map(str::to_owned),
    }
}

#[rstest]
#[tokio::test]
async fn create_persists_an_empty_record(now: DateTime<Utc>) {
    let mut repo = MockConnectionRepository::new();
    repo.expect_find().times(1).returning(|_| Ok(None));
    repo.expect_save()
        .withf(move |record| {
            record.connection_id.as_str() == "AB3D9F2K"
                && record.created_at == now
                && record.updated_at == now
                && record.last_photo_url.is_none()
                && record.last_caption.is_none()
        })
        .times(1)
        .returning(|_| Ok(()));

    let service = make_service_with(repo, MockPhotoStore::new(), codes_yielding(&["AB3D9F2K"]), now, 5);
    let record = service.create().await.expect("create succeeds");

    assert_eq!(record.connection_id.as_str(), "AB3D9F2K");
    assert_eq!(record.created_at, record.updated_at);
}

#[rstest]
#[tokio::test]
async fn create_retries_when_the_code_is_taken(now: DateTime<Utc>) {
    let mut repo = MockConnectionRepository::new();
    repo.expect_find().times(2).returning(move |candidate| {
        Ok((candidate.as_str() == "TAKEN001").then(|| ConnectionRecord::new(candidate.clone(), now)))
    });
    repo.expect_save()
        .withf(|record| record.connection_id.as_str() == "FRESH002")
        .times(1)
        .returning(|_| Ok(()));

    let service = make_service_with(
        repo,
        MockPhotoStore::new(),
        codes_yielding(&["TAKEN001", "FRESH002"]),
        now,
        5,
    );
    let record = service.create().await.expect("create succeeds");

    assert_eq!(record.connection_id.as_str(), "FRESH002");
}

#[rstest]
#[tokio::test]
async fn create_gives_up_after_bounded_collisions(now: DateTime<Utc>) {
    let mut repo = MockConnectionRepository::new();
    repo.expect_find()
        .times(2)
        .returning(move |candidate| Ok(Some(ConnectionRecord::new(candidate.clone(), now))));
    repo.expect_save().times(0);

    let service = make_service_with(
        repo,
        MockPhotoStore::new(),
        codes_yielding(&["TAKEN001", "TAKEN002"]),
        now,
        2,
    );
    let error = service.create().await.expect_err("collisions exhaust attempts");

    assert_eq!(error.code(), ErrorCode::StorageUnavailable);
}

#[rstest]
#[tokio::test]
async fn create_reports_store_failures(now: DateTime<Utc>) {
    let mut repo = MockConnectionRepository::new();
    repo.expect_find().times(1).returning(|_| Ok(None));
    repo.expect_save()
        .times(1)
        .returning(|_| Err(ConnectionRepositoryError::connection("refused")));

    let service = make_service_with(repo, MockPhotoStore::new(), codes_yielding(&["AB3D9F2K"]), now, 5);
    let error = service.create().await.expect_err("store is down");

    assert_eq!(error.code(), ErrorCode::StorageUnavailable);
}

#[rstest]
#[tokio::test]
async fn update_photo_rejects_unknown_connections(now: DateTime<Utc>) {
    let mut repo = MockConnectionRepository::new();
    repo.expect_find().times(1).returning(|_| Ok(None));
    repo.expect_save().times(0);

    let service = make_service(repo, MockPhotoStore::new(), now);
    let error = service
        .update_photo(UpdatePhotoRequest {
            connection_id: id("ZZZZZZZZ"),
            update: PhotoUpdate::with_photo_url("https://cdn/p.jpg"),
        })
        .await
        .expect_err("unknown connection");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), CONNECTION_NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn update_photo_applies_fields_and_stamps_time(now: DateTime<Utc>) {
    let created_at = now - Duration::minutes(3);
    let mut existing = ConnectionRecord::new(id("AB3D9F2K"), created_at);
    existing.last_photo_url = Some("https://cdn/p1.jpg".to_owned());

    let mut repo = MockConnectionRepository::new();
    repo.expect_find()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    repo.expect_save()
        .withf(move |record| {
            record.last_photo_url.as_deref() == Some("https://cdn/p1.jpg")
                && record.last_caption.as_deref() == Some("hi")
                && record.created_at == created_at
                && record.updated_at == now
        })
        .times(1)
        .returning(|_| Ok(()));

    let service = make_service(repo, MockPhotoStore::new(), now);
    let response = service
        .update_photo(UpdatePhotoRequest {
            connection_id: id("AB3D9F2K"),
            update: PhotoUpdate {
                caption: CaptionUpdate::Set("hi".to_owned()),
                ..PhotoUpdate::default()
            },
        })
        .await
        .expect("update succeeds");

    assert_eq!(response.updated_at, now);
}

#[rstest]
#[tokio::test]
async fn upload_creates_missing_connection(now: DateTime<Utc>) {
    let mut photos = MockPhotoStore::new();
    photos
        .expect_put()
        .withf(|path, photo| {
            path.to_string() == "AB3D9F2K/1712345678901.png"
                && photo.content_type == "image/png"
                && photo.bytes.as_ref() == b"png-bytes"
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let mut repo = MockConnectionRepository::new();
    repo.expect_find().times(1).returning(|_| Ok(None));
    repo.expect_save()
        .withf(move |record| {
            record.connection_id.as_str() == "AB3D9F2K"
                && record.last_photo_url.as_deref()
                    == Some("https://photos.example.com/AB3D9F2K/1712345678901.png")
                && record.last_caption.is_none()
                && record.created_at == now
        })
        .times(1)
        .returning(|_| Ok(()));

    let service = make_service(repo, photos, now);
    let response = service
        .upload_photo(upload(b"png-bytes", Some("image/png"), Some("a.png")))
        .await
        .expect("upload succeeds");

    assert_eq!(
        response.photo_url,
        "https://photos.example.com/AB3D9F2K/1712345678901.png"
    );
}

#[rstest]
#[tokio::test]
async fn upload_keeps_existing_caption(now: DateTime<Utc>) {
    let mut existing = ConnectionRecord::new(id("AB3D9F2K"), now - Duration::hours(1));
    existing.last_caption = Some("keep me".to_owned());

    let mut photos = MockPhotoStore::new();
    photos.expect_put().times(1).returning(|_, _| Ok(()));
    let mut repo = MockConnectionRepository::new();
    repo.expect_find()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    repo.expect_save()
        .withf(|record| {
            record.last_caption.as_deref() == Some("keep me")
                && record
                    .last_photo_url
                    .as_deref()
                    .is_some_and(|url| url.ends_with(".jpg"))
        })
        .times(1)
        .returning(|_| Ok(()));

    let service = make_service(repo, photos, now);
    service
        .upload_photo(upload(b"jpeg", None, None))
        .await
        .expect("upload succeeds");
}

#[rstest]
#[case(None)]
#[case(Some(""))]
#[case(Some("   "))]
#[tokio::test]
async fn upload_defaults_missing_content_type(
    now: DateTime<Utc>,
    #[case] content_type: Option<&'static str>,
) {
    let mut photos = MockPhotoStore::new();
    photos
        .expect_put()
        .withf(|_, photo| photo.content_type == DEFAULT_PHOTO_CONTENT_TYPE)
        .times(1)
        .returning(|_, _| Ok(()));
    let mut repo = MockConnectionRepository::new();
    repo.expect_find().returning(|_| Ok(None));
    repo.expect_save().returning(|_| Ok(()));

    let service = make_service(repo, photos, now);
    service
        .upload_photo(upload(b"raw", content_type, Some("raw.bin")))
        .await
        .expect("upload succeeds");
}

#[rstest]
#[tokio::test]
async fn upload_rejects_empty_payloads(now: DateTime<Utc>) {
    let mut photos = MockPhotoStore::new();
    photos.expect_put().times(0);
    let mut repo = MockConnectionRepository::new();
    repo.expect_save().times(0);

    let service = make_service(repo, photos, now);
    let error = service
        .upload_photo(upload(b"", Some("image/png"), Some("a.png")))
        .await
        .expect_err("empty upload");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), UPLOAD_INCOMPLETE);
}

#[rstest]
#[tokio::test]
async fn upload_rejects_ids_that_cannot_name_a_blob_directory(now: DateTime<Utc>) {
    let mut photos = MockPhotoStore::new();
    photos.expect_put().times(0);
    let mut repo = MockConnectionRepository::new();
    repo.expect_find().times(0);
    repo.expect_save().times(0);

    let service = make_service(repo, photos, now);
    let error = service
        .upload_photo(PhotoUpload {
            connection_id: id("a.b"),
            ..upload(b"png", Some("image/png"), Some("a.png"))
        })
        .await
        .expect_err("unsafe upload id");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        error.details().and_then(|d| d.get("code")),
        Some(&serde_json::json!("invalid_connection_id"))
    );
}

#[rstest]
#[tokio::test]
async fn upload_surfaces_blob_failures_without_touching_records(now: DateTime<Utc>) {
    let mut photos = MockPhotoStore::new();
    photos
        .expect_put()
        .times(1)
        .returning(|path, _| Err(PhotoStoreError::io(path.to_string(), "disk full")));
    let mut repo = MockConnectionRepository::new();
    repo.expect_find().times(0);
    repo.expect_save().times(0);

    let service = make_service(repo, photos, now);
    let error = service
        .upload_photo(upload(b"png", Some("image/png"), Some("a.png")))
        .await
        .expect_err("blob store failed");

    assert_eq!(error.code(), ErrorCode::StorageUnavailable);
}

#[rstest]
#[tokio::test]
async fn delete_is_forwarded_to_the_store(now: DateTime<Utc>) {
    let mut repo = MockConnectionRepository::new();
    repo.expect_delete()
        .withf(|connection_id| connection_id.as_str() == "ZZZZZZZZ")
        .times(1)
        .returning(|_| Ok(()));

    let service = make_service(repo, MockPhotoStore::new(), now);
    service
        .delete(&id("ZZZZZZZZ"))
        .await
        .expect("deleting unknown connections succeeds");
}

#[rstest]
#[tokio::test]
async fn latest_returns_stored_record(now: DateTime<Utc>) {
    let mut stored = ConnectionRecord::new(id("AB3D9F2K"), now);
    stored.last_caption = Some("C1".to_owned());
    let expected = stored.clone();

    let mut repo = MockConnectionRepository::new();
    repo.expect_find()
        .times(1)
        .return_once(move |_| Ok(Some(stored)));

    let service = make_service(repo, MockPhotoStore::new(), now);
    let record = service.latest(&id("AB3D9F2K")).await.expect("record found");

    assert_eq!(record, expected);
}

#[rstest]
#[tokio::test]
async fn latest_reports_unknown_connections(now: DateTime<Utc>) {
    let mut repo = MockConnectionRepository::new();
    repo.expect_find().times(1).returning(|_| Ok(None));

    let service = make_service(repo, MockPhotoStore::new(), now);
    let error = service
        .latest(&id("ZZZZZZZZ"))
        .await
        .expect_err("unknown connection");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn latest_treats_corrupt_records_as_internal(now: DateTime<Utc>) {
    let mut repo = MockConnectionRepository::new();
    repo.expect_find()
        .times(1)
        .returning(|_| Err(ConnectionRepositoryError::serialization("expected value")));

    let service = make_service(repo, MockPhotoStore::new(), now);
    let error = service
        .latest(&id("AB3D9F2K"))
        .await
        .expect_err("corrupt record");

    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn fetch_photo_reports_missing_blobs(now: DateTime<Utc>) {
    let mut photos = MockPhotoStore::new();
    photos.expect_get().times(1).returning(|_| Ok(None));

    let service = make_service(MockConnectionRepository::new(), photos, now);
    let path = PhotoPath::parse("AB3D9F2K/1.png").expect("path");
    let error = service.fetch_photo(&path).await.expect_err("missing blob");

    assert_eq!(error.code(), ErrorCode::NotFound);
}
