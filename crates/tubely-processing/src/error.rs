//! Pipeline error taxonomy.
//!
//! Every stage returns a [`PipelineError`]. The orchestrator wraps the first
//! one it sees in an [`IngestionFailure`] together with the stage that was
//! being entered, and that is what callers receive.

use std::fmt::{Display, Formatter, Result as FmtResult};

use thiserror::Error;
use tubely_core::models::StreamGeometry;
use tubely_core::AppError;
use tubely_storage::StorageError;
use uuid::Uuid;

use crate::video::ToolError;

/// States of a single ingestion, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Received,
    Validated,
    Staged,
    Probed,
    Classified,
    Optimized,
    Uploaded,
    Persisted,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Received => "received",
            PipelineStage::Validated => "validated",
            PipelineStage::Staged => "staged",
            PipelineStage::Probed => "probed",
            PipelineStage::Classified => "classified",
            PipelineStage::Optimized => "optimized",
            PipelineStage::Uploaded => "uploaded",
            PipelineStage::Persisted => "persisted",
        }
    }
}

impl Display for PipelineStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Coarse failure families used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    Authorization,
    Content,
    Tooling,
    Transfer,
    Storage,
    Lookup,
    Persistence,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("upload exceeds the {limit_bytes} byte limit")]
    PayloadTooLarge { limit_bytes: u64 },

    #[error("video {0} not found")]
    VideoNotFound(Uuid),

    #[error("principal {principal} does not own video {video_id}")]
    NotOwner { video_id: Uuid, principal: Uuid },

    #[error("failed to stage upload: {0}")]
    Transfer(#[source] std::io::Error),

    #[error("no video stream found")]
    NoVideoStream,

    #[error("invalid stream geometry: {0}")]
    InvalidGeometry(StreamGeometry),

    #[error("probe failed: {0}")]
    ProbeFailure(#[source] ToolError),

    #[error("remux failed: {0}")]
    TranscodeFailure(String),

    #[error("remote storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("metadata lookup failed: {0}")]
    MetadataLookup(#[source] AppError),

    #[error("metadata update failed: {0}")]
    Persistence(#[source] AppError),
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::UnsupportedContentType(_) | PipelineError::PayloadTooLarge { .. } => {
                FailureKind::Validation
            }
            PipelineError::VideoNotFound(_) | PipelineError::NotOwner { .. } => {
                FailureKind::Authorization
            }
            PipelineError::Transfer(_) => FailureKind::Transfer,
            PipelineError::NoVideoStream | PipelineError::InvalidGeometry(_) => {
                FailureKind::Content
            }
            PipelineError::ProbeFailure(_) | PipelineError::TranscodeFailure(_) => {
                FailureKind::Tooling
            }
            PipelineError::Storage(_) => FailureKind::Storage,
            PipelineError::MetadataLookup(_) => FailureKind::Lookup,
            PipelineError::Persistence(_) => FailureKind::Persistence,
        }
    }
}

/// Terminal failure of one ingestion.
///
/// `stage` is the state the pipeline was trying to reach when `error` occurred.
#[derive(Debug, Error)]
#[error("ingestion failed entering {stage}: {error}")]
pub struct IngestionFailure {
    pub stage: PipelineStage,
    #[source]
    pub error: PipelineError,
}

impl IngestionFailure {
    pub fn new(stage: PipelineStage, error: PipelineError) -> Self {
        Self { stage, error }
    }

    pub fn kind(&self) -> FailureKind {
        self.error.kind()
    }
}

impl From<IngestionFailure> for AppError {
    fn from(failure: IngestionFailure) -> Self {
        match failure.error {
            PipelineError::UnsupportedContentType(content_type) => AppError::InvalidInput(
                format!("Unsupported content type: {}", content_type),
            ),
            PipelineError::PayloadTooLarge { limit_bytes } => AppError::PayloadTooLarge(format!(
                "Video exceeds the maximum size of {} bytes",
                limit_bytes
            )),
            PipelineError::VideoNotFound(_) => {
                AppError::NotFound("Couldn't find video".to_string())
            }
            PipelineError::NotOwner { .. } => {
                AppError::Unauthorized("You can't upload a video for this record".to_string())
            }
            PipelineError::NoVideoStream => {
                AppError::UnsupportedVideoContent("No video stream found".to_string())
            }
            PipelineError::InvalidGeometry(geometry) => AppError::UnsupportedVideoContent(
                format!("Invalid video dimensions: {}", geometry),
            ),
            PipelineError::ProbeFailure(err) => AppError::MediaConversionError(err.to_string()),
            PipelineError::TranscodeFailure(msg) => AppError::MediaConversionError(msg),
            PipelineError::Transfer(err) => {
                AppError::Internal(format!("Failed to stage upload: {}", err))
            }
            PipelineError::Storage(err) => AppError::S3(err.to_string()),
            PipelineError::MetadataLookup(err) => AppError::InternalWithSource {
                message: "Failed to load video".to_string(),
                source: anyhow::Error::new(err),
            },
            // The record was already resolved, so any update error is a server fault.
            PipelineError::Persistence(err) => AppError::InternalWithSource {
                message: "Failed to save video".to_string(),
                source: anyhow::Error::new(err),
            },
        }
    }
}
