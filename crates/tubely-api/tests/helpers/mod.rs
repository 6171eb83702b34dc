//! Test helpers: build the real router over in-memory collaborators.
//!
//! Run from workspace root: `cargo test -p tubely-api`. No ffmpeg, S3 or
//! Postgres is needed.

pub mod auth;

use axum_test::TestServer;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::constants;
use tubely_api::setup::routes;
use tubely_api::state::AppState;
use tubely_core::Config;
use tubely_processing::test_helpers::{FakeMediaTools, MemoryStorage, MemoryVideoRepository};
use tubely_processing::{IngestionPipeline, PipelineSettings};

pub const PUBLIC_BASE_URL: &str = "https://tubely.s3.us-east-2.amazonaws.com";

/// API path prefix for tests (e.g. `/api`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus handles on every fake collaborator.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<MemoryStorage>,
    pub tools: Arc<FakeMediaTools>,
    pub videos: Arc<MemoryVideoRepository>,
    pub staging: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of files left in the transient store.
    pub fn staged_files(&self) -> usize {
        count_entries(self.staging.path())
    }
}

fn count_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

pub fn test_config(staging_dir: &Path, overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("DATABASE_URL", "postgres://localhost/tubely_test"),
        ("JWT_SECRET", auth::TEST_JWT_SECRET),
        ("STORAGE_BACKEND", "local"),
        ("LOCAL_STORAGE_PATH", "/tmp/tubely-assets"),
        ("LOCAL_STORAGE_BASE_URL", PUBLIC_BASE_URL),
        ("MAX_VIDEO_SIZE_MB", "1"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    vars.insert(
        "UPLOAD_TEMP_DIR".to_string(),
        staging_dir.display().to_string(),
    );
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }

    let config = Config::from_vars(&vars).unwrap();
    config.validate().unwrap();
    config
}

/// Setup a test app whose probe reports the given tools' streams.
pub fn setup_test_app(tools: FakeMediaTools) -> TestApp {
    setup_test_app_with(tools, MemoryStorage::new(PUBLIC_BASE_URL))
}

pub fn setup_test_app_with(tools: FakeMediaTools, storage: MemoryStorage) -> TestApp {
    let staging = tempfile::tempdir().unwrap();
    let config = test_config(staging.path(), &[]);

    let tools = Arc::new(tools);
    let storage = Arc::new(storage);
    let videos = Arc::new(MemoryVideoRepository::new());

    let pipeline = IngestionPipeline::new(
        PipelineSettings::from_config(&config),
        tools.clone(),
        storage.clone(),
        videos.clone(),
    );
    let state = Arc::new(AppState::new(config, pipeline));
    let app = routes::setup_routes(state);

    TestApp {
        server: TestServer::new(app).unwrap(),
        storage,
        tools,
        videos,
        staging,
    }
}
