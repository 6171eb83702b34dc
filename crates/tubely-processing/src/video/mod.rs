//! Video ingestion pipeline

pub mod aspect;
pub mod ffmpeg;
pub mod optimize;
pub mod orchestration;
pub mod probe;
pub mod router;
pub mod staging;
pub mod tools;

pub use aspect::AspectClassifier;
pub use ffmpeg::FfmpegTools;
pub use optimize::ContainerOptimizer;
pub use orchestration::{IngestionPipeline, PipelineSettings, UploadRequest};
pub use probe::GeometryProber;
pub use router::ObjectRouter;
pub use staging::{BodyLimitExceeded, StagedArtifact, TransientStore};
pub use tools::{MediaTools, ProbeReport, ProbeStream, ToolError};
