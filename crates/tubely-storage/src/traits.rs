//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Locator generation failed: {0}")]
    LocatorFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Implemented by the S3 and local filesystem backends, and by in-memory
/// fakes in tests. Keys are `{namespace}/{name}` strings produced by
/// [`crate::RemoteKey`].
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload the file at `source` under `key` with the given content type.
    ///
    /// Returns the number of bytes written.
    async fn upload_file(&self, key: &str, source: &Path, content_type: &str)
        -> StorageResult<u64>;

    /// Externally resolvable address for `key`.
    ///
    /// Depending on the configured strategy this is either a deterministic
    /// public URL or a time-limited signed GET URL.
    async fn locator(&self, key: &str) -> StorageResult<String>;

    /// Delete an object by key
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
