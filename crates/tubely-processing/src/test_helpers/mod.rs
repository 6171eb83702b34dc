//! In-memory collaborators for exercising the pipeline without ffmpeg, S3
//! or Postgres.
//!
//! Enabled for this crate's own tests and, through the `test-helpers`
//! feature, for downstream integration tests.

pub mod media_tools;
pub mod storage;
pub mod videos;

pub use media_tools::FakeMediaTools;
pub use storage::MemoryStorage;
pub use videos::MemoryVideoRepository;
