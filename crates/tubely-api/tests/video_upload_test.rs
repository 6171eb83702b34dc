//! Video upload API integration tests.
//!
//! Run with: `cargo test -p tubely-api --test video_upload_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::auth::{bearer, make_token, make_token_with, TEST_JWT_SECRET};
use helpers::{api_path, setup_test_app, setup_test_app_with, PUBLIC_BASE_URL};
use tubely_core::models::VideoRecord;
use tubely_processing::test_helpers::{FakeMediaTools, MemoryStorage};
use uuid::Uuid;

const MP4_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42\x00\x00\x00\x00mp42isom";

fn video_form(bytes: &[u8], mime: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "video",
        Part::bytes(bytes.to_vec())
            .file_name("boots.mp4")
            .mime_type(mime),
    )
}

#[tokio::test]
async fn test_owner_upload_lands_under_landscape() {
    let app = setup_test_app(FakeMediaTools::with_geometry(1920, 1080));
    let owner = Uuid::new_v4();
    let video = app.videos.insert_for(owner);

    let response = app
        .client()
        .post(&api_path(&format!("/video_upload/{}", video.id)))
        .add_header("Authorization", bearer(&make_token(owner)))
        .multipart(video_form(MP4_BYTES, "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: VideoRecord = response.json();
    let url = body.video_url.clone().unwrap();
    assert!(url.starts_with(&format!("{}/landscape/", PUBLIC_BASE_URL)));
    assert!(url.ends_with(".mp4"));
    assert_eq!(body.id, video.id);
    assert_eq!(body.user_id, owner);

    let stored = app.videos.get(video.id).unwrap();
    assert_eq!(stored.video_url.as_deref(), Some(url.as_str()));

    let keys = app.storage.keys();
    assert_eq!(keys.len(), 1);
    let (bytes, content_type) = app.storage.object(&keys[0]).unwrap();
    assert_eq!(bytes, MP4_BYTES);
    assert_eq!(content_type, "video/mp4");
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_portrait_upload_lands_under_portrait() {
    let app = setup_test_app(FakeMediaTools::with_geometry(1080, 1920));
    let owner = Uuid::new_v4();
    let video = app.videos.insert_for(owner);

    let response = app
        .client()
        .post(&api_path(&format!("/video_upload/{}", video.id)))
        .add_header("Authorization", bearer(&make_token(owner)))
        .multipart(video_form(MP4_BYTES, "video/mp4; codecs=avc1"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: VideoRecord = response.json();
    assert!(body.video_url.unwrap().contains("/portrait/"));
}

#[tokio::test]
async fn test_non_owner_is_rejected_without_upload() {
    let app = setup_test_app(FakeMediaTools::with_geometry(1920, 1080));
    let video = app.videos.insert_for(Uuid::new_v4());

    let response = app
        .client()
        .post(&api_path(&format!("/video_upload/{}", video.id)))
        .add_header("Authorization", bearer(&make_token(Uuid::new_v4())))
        .multipart(video_form(MP4_BYTES, "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 401);
    assert_eq!(app.storage.upload_calls(), 0);
    assert_eq!(app.tools.probe_calls(), 0);
    assert!(app.videos.get(video.id).unwrap().video_url.is_none());
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_wrong_content_type_is_bad_request() {
    let app = setup_test_app(FakeMediaTools::with_geometry(1920, 1080));
    let owner = Uuid::new_v4();
    let video = app.videos.insert_for(owner);

    let response = app
        .client()
        .post(&api_path(&format!("/video_upload/{}", video.id)))
        .add_header("Authorization", bearer(&make_token(owner)))
        .multipart(video_form(b"just text", "text/plain"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(app.tools.probe_calls(), 0);
    assert_eq!(app.storage.upload_calls(), 0);
}

#[tokio::test]
async fn test_no_video_stream_is_rejected_without_upload() {
    let app = setup_test_app(FakeMediaTools::without_video());
    let owner = Uuid::new_v4();
    let video = app.videos.insert_for(owner);

    let response = app
        .client()
        .post(&api_path(&format!("/video_upload/{}", video.id)))
        .add_header("Authorization", bearer(&make_token(owner)))
        .multipart(video_form(MP4_BYTES, "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UNSUPPORTED_VIDEO_CONTENT");
    assert_eq!(app.tools.remux_calls(), 0);
    assert_eq!(app.storage.upload_calls(), 0);
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_storage_failure_is_internal_error() {
    let app = setup_test_app_with(
        FakeMediaTools::with_geometry(1920, 1080),
        MemoryStorage::new(PUBLIC_BASE_URL).failing_uploads(),
    );
    let owner = Uuid::new_v4();
    let video = app.videos.insert_for(owner);

    let response = app
        .client()
        .post(&api_path(&format!("/video_upload/{}", video.id)))
        .add_header("Authorization", bearer(&make_token(owner)))
        .multipart(video_form(MP4_BYTES, "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert!(body.get("details").is_none());
    assert_eq!(app.videos.update_calls(), 0);
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_unknown_video_is_not_found() {
    let app = setup_test_app(FakeMediaTools::with_geometry(1920, 1080));
    let owner = Uuid::new_v4();

    let response = app
        .client()
        .post(&api_path(&format!("/video_upload/{}", Uuid::new_v4())))
        .add_header("Authorization", bearer(&make_token(owner)))
        .multipart(video_form(MP4_BYTES, "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_oversized_upload_is_payload_too_large() {
    let app = setup_test_app(FakeMediaTools::with_geometry(1920, 1080));
    let owner = Uuid::new_v4();
    let video = app.videos.insert_for(owner);
    let oversized = vec![0u8; 1024 * 1024 + 16];

    let response = app
        .client()
        .post(&api_path(&format!("/video_upload/{}", video.id)))
        .add_header("Authorization", bearer(&make_token(owner)))
        .multipart(video_form(&oversized, "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 413);
    assert_eq!(app.tools.probe_calls(), 0);
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_invalid_id_is_bad_request() {
    let app = setup_test_app(FakeMediaTools::with_geometry(1920, 1080));

    let response = app
        .client()
        .post(&api_path("/video_upload/not-a-uuid"))
        .add_header("Authorization", bearer(&make_token(Uuid::new_v4())))
        .multipart(video_form(MP4_BYTES, "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid ID");
}

#[tokio::test]
async fn test_missing_video_field_is_bad_request() {
    let app = setup_test_app(FakeMediaTools::with_geometry(1920, 1080));
    let owner = Uuid::new_v4();
    let video = app.videos.insert_for(owner);

    let form = MultipartForm::new().add_text("title", "no video here");
    let response = app
        .client()
        .post(&api_path(&format!("/video_upload/{}", video.id)))
        .add_header("Authorization", bearer(&make_token(owner)))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(app.videos.get_calls(), 0);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = setup_test_app(FakeMediaTools::with_geometry(1920, 1080));
    let video = app.videos.insert_for(Uuid::new_v4());

    let response = app
        .client()
        .post(&api_path(&format!("/video_upload/{}", video.id)))
        .multipart(video_form(MP4_BYTES, "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 401);
    assert_eq!(app.videos.get_calls(), 0);
}

#[tokio::test]
async fn test_token_with_wrong_issuer_is_unauthorized() {
    let app = setup_test_app(FakeMediaTools::with_geometry(1920, 1080));
    let owner = Uuid::new_v4();
    let video = app.videos.insert_for(owner);

    let token = make_token_with(owner, TEST_JWT_SECRET, "somebody-else");
    let response = app
        .client()
        .post(&api_path(&format!("/video_upload/{}", video.id)))
        .add_header("Authorization", bearer(&token))
        .multipart(video_form(MP4_BYTES, "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 401);
    assert_eq!(app.storage.upload_calls(), 0);
}
