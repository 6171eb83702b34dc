//! Tubely Processing Library
//!
//! The video ingestion pipeline: stage the upload locally, probe its
//! geometry, classify its aspect ratio, remux it for fast start and route it
//! to remote storage under a namespaced key.
//!
//! External tools are reached through the [`MediaTools`] trait so the
//! pipeline can run against fakes in tests.

pub mod error;
pub mod video;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use error::{FailureKind, IngestionFailure, PipelineError, PipelineStage};
pub use video::{
    AspectClassifier, BodyLimitExceeded, ContainerOptimizer, FfmpegTools, GeometryProber,
    IngestionPipeline, MediaTools, ObjectRouter, PipelineSettings, ProbeReport, ProbeStream,
    StagedArtifact, ToolError, TransientStore, UploadRequest,
};
