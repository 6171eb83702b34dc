//! Health and OpenAPI endpoint tests.

mod helpers;

use helpers::{api_path, setup_test_app};
use tubely_processing::test_helpers::FakeMediaTools;

#[tokio::test]
async fn test_health_check() {
    let app = setup_test_app(FakeMediaTools::with_geometry(1920, 1080));

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_openapi_document_is_public() {
    let app = setup_test_app(FakeMediaTools::with_geometry(1920, 1080));

    let response = app.client().get(&api_path("/openapi.json")).await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert!(body["paths"]
        .get("/api/video_upload/{video_id}")
        .is_some());
}
