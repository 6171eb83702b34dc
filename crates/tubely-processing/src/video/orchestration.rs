//! Video ingestion orchestration: validate → stage → probe → classify → remux → upload → persist.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::AsyncRead;
use tubely_core::constants::VIDEO_CONTENT_TYPE;
use tubely_core::models::VideoRecord;
use tubely_core::{Config, LogLevel, ToleranceMode};
use tubely_db::VideoRepositoryTrait;
use tubely_storage::Storage;
use uuid::Uuid;

use super::aspect::AspectClassifier;
use super::optimize::ContainerOptimizer;
use super::probe::GeometryProber;
use super::router::ObjectRouter;
use super::staging::TransientStore;
use super::tools::MediaTools;
use crate::error::{FailureKind, IngestionFailure, PipelineError, PipelineStage};

/// Settings for the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub staging_dir: PathBuf,
    pub max_upload_bytes: u64,
    pub allowed_content_types: Vec<String>,
    pub max_concurrent_remuxes: usize,
    pub aspect_tolerance: f64,
    pub aspect_tolerance_mode: ToleranceMode,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            staging_dir: config.upload_temp_dir().clone(),
            max_upload_bytes: config.max_video_size_bytes() as u64,
            allowed_content_types: config.video_allowed_content_types().to_vec(),
            max_concurrent_remuxes: config.max_concurrent_transcodes(),
            aspect_tolerance: config.aspect_tolerance(),
            aspect_tolerance_mode: config.aspect_tolerance_mode(),
        }
    }
}

/// One upload to ingest.
pub struct UploadRequest<'a> {
    pub video_id: Uuid,
    pub principal: Uuid,
    pub content_type: String,
    pub body: Box<dyn AsyncRead + Send + Unpin + 'a>,
}

/// Strip parameters and normalise case: `Video/MP4; codecs=avc1` → `video/mp4`.
fn normalize_content_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

fn failure_level(kind: FailureKind) -> LogLevel {
    match kind {
        FailureKind::Validation | FailureKind::Authorization => LogLevel::Debug,
        FailureKind::Content => LogLevel::Warn,
        FailureKind::Tooling
        | FailureKind::Transfer
        | FailureKind::Storage
        | FailureKind::Lookup
        | FailureKind::Persistence => LogLevel::Error,
    }
}

/// Ingestion Orchestrator.
///
/// Each call to [`IngestionPipeline::ingest`] is an independent pipeline; the
/// struct itself only holds shared read-only collaborators and is cheap to
/// clone.
#[derive(Clone)]
pub struct IngestionPipeline {
    store: TransientStore,
    prober: GeometryProber,
    classifier: AspectClassifier,
    optimizer: ContainerOptimizer,
    router: ObjectRouter,
    videos: Arc<dyn VideoRepositoryTrait>,
    allowed_content_types: Vec<String>,
}

impl IngestionPipeline {
    pub fn new(
        settings: PipelineSettings,
        tools: Arc<dyn MediaTools>,
        storage: Arc<dyn Storage>,
        videos: Arc<dyn VideoRepositoryTrait>,
    ) -> Self {
        let store = TransientStore::new(settings.staging_dir, settings.max_upload_bytes);
        Self {
            prober: GeometryProber::new(tools.clone()),
            classifier: AspectClassifier::new(
                settings.aspect_tolerance,
                settings.aspect_tolerance_mode,
            ),
            optimizer: ContainerOptimizer::new(
                tools,
                store.clone(),
                settings.max_concurrent_remuxes,
            ),
            router: ObjectRouter::new(storage, VIDEO_CONTENT_TYPE),
            videos,
            allowed_content_types: settings.allowed_content_types,
            store,
        }
    }

    /// Run one upload through every stage and return the updated record.
    ///
    /// Ownership is checked before the body is read. Every staged artifact is
    /// removed before this returns, whatever the outcome.
    #[tracing::instrument(skip(self, request), fields(video_id = %request.video_id, user_id = %request.principal))]
    pub async fn ingest(&self, request: UploadRequest<'_>) -> Result<VideoRecord, IngestionFailure> {
        let start = std::time::Instant::now();
        let video_id = request.video_id;

        match self.run(request).await {
            Ok(video) => {
                tracing::info!(
                    video_id = %video_id,
                    video_url = video.video_url.as_deref().unwrap_or_default(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Video ingested"
                );
                Ok(video)
            }
            Err(failure) => {
                let kind = failure.kind();
                match failure_level(kind) {
                    LogLevel::Debug => tracing::debug!(
                        video_id = %video_id,
                        stage = %failure.stage,
                        error = %failure.error,
                        "Video ingestion rejected"
                    ),
                    LogLevel::Warn => tracing::warn!(
                        video_id = %video_id,
                        stage = %failure.stage,
                        error = %failure.error,
                        "Video ingestion rejected"
                    ),
                    LogLevel::Error => tracing::error!(
                        video_id = %video_id,
                        stage = %failure.stage,
                        error = %failure.error,
                        "Video ingestion failed"
                    ),
                }
                Err(failure)
            }
        }
    }

    async fn run(&self, request: UploadRequest<'_>) -> Result<VideoRecord, IngestionFailure> {
        let UploadRequest {
            video_id,
            principal,
            content_type,
            body,
        } = request;
        let fail = |stage: PipelineStage| move |error: PipelineError| IngestionFailure::new(stage, error);

        transition(video_id, PipelineStage::Received);

        let content_type = normalize_content_type(&content_type);
        if !self.allowed_content_types.iter().any(|t| *t == content_type) {
            return Err(IngestionFailure::new(
                PipelineStage::Validated,
                PipelineError::UnsupportedContentType(content_type),
            ));
        }

        let mut video = self
            .videos
            .get_video(video_id)
            .await
            .map_err(PipelineError::MetadataLookup)
            .map_err(fail(PipelineStage::Validated))?
            .ok_or(PipelineError::VideoNotFound(video_id))
            .map_err(fail(PipelineStage::Validated))?;

        if !video.is_owned_by(principal) {
            return Err(IngestionFailure::new(
                PipelineStage::Validated,
                PipelineError::NotOwner {
                    video_id,
                    principal,
                },
            ));
        }
        transition(video_id, PipelineStage::Validated);

        let mut staged = self
            .store
            .stage(body)
            .await
            .map_err(fail(PipelineStage::Staged))?;
        transition(video_id, PipelineStage::Staged);

        let geometry = self
            .prober
            .probe(&staged)
            .await
            .map_err(fail(PipelineStage::Probed))?;
        tracing::debug!(video_id = %video_id, geometry = %geometry, "Video probed");
        transition(video_id, PipelineStage::Probed);

        let class = self
            .classifier
            .classify(geometry)
            .map_err(fail(PipelineStage::Classified))?;
        tracing::debug!(video_id = %video_id, aspect = %class, "Video classified");
        transition(video_id, PipelineStage::Classified);

        let mut optimized = self
            .optimizer
            .optimize(&mut staged)
            .await
            .map_err(fail(PipelineStage::Optimized))?;
        transition(video_id, PipelineStage::Optimized);

        let key = self.router.route(class);
        let locator = self
            .router
            .upload(&optimized, &key)
            .await
            .map_err(fail(PipelineStage::Uploaded))?;
        optimized.release_logged();
        tracing::debug!(video_id = %video_id, key = %key, "Video uploaded");
        transition(video_id, PipelineStage::Uploaded);

        video.attach_locator(locator);
        let updated = match self.videos.update_video(&video).await {
            Ok(updated) => updated,
            Err(e) => {
                self.router.discard(&key).await;
                return Err(IngestionFailure::new(
                    PipelineStage::Persisted,
                    PipelineError::Persistence(e),
                ));
            }
        };
        transition(video_id, PipelineStage::Persisted);

        Ok(updated)
    }
}

fn transition(video_id: Uuid, stage: PipelineStage) {
    tracing::debug!(video_id = %video_id, stage = %stage, "Pipeline transition");
}
