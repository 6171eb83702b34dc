//! Ingestion pipeline wiring

use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::{FfmpegTools, IngestionPipeline, PipelineSettings};

use super::storage::setup_storage;
use crate::state::AppState;

/// Build the shared pipeline collaborators and the application state.
pub async fn setup_services(config: Config, pool: PgPool) -> Result<AppState> {
    let storage = setup_storage(&config).await?;

    let tools = FfmpegTools::new(
        config.ffmpeg_path().to_string(),
        config.ffprobe_path().to_string(),
    )
    .context("Invalid FFMPEG_PATH or FFPROBE_PATH")?;

    tokio::fs::create_dir_all(config.upload_temp_dir())
        .await
        .with_context(|| {
            format!(
                "Failed to create upload temp dir {}",
                config.upload_temp_dir().display()
            )
        })?;

    let settings = PipelineSettings::from_config(&config);
    tracing::info!(
        staging_dir = %settings.staging_dir.display(),
        max_upload_bytes = settings.max_upload_bytes,
        max_concurrent_remuxes = settings.max_concurrent_remuxes,
        aspect_tolerance = settings.aspect_tolerance,
        aspect_tolerance_mode = ?settings.aspect_tolerance_mode,
        "Ingestion pipeline configured"
    );

    let pipeline = IngestionPipeline::new(
        settings,
        Arc::new(tools),
        storage,
        Arc::new(VideoRepository::new(pool)),
    );

    Ok(AppState::new(config, pipeline))
}
