//! Transient Store: single-use local staging files.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tubely_core::constants::{STAGING_FILE_PREFIX, VIDEO_EXTENSION};

use crate::error::PipelineError;

/// Marker error a body reader can raise to signal that the client sent more
/// than the transport allows. Staging reports it as `PayloadTooLarge`.
#[derive(Debug, thiserror::Error)]
#[error("request body limit exceeded")]
pub struct BodyLimitExceeded;

/// Exclusively owned local file backing one stage of an ingestion.
///
/// The file is removed by [`StagedArtifact::release`] or, failing that, when
/// the artifact is dropped.
#[derive(Debug)]
pub struct StagedArtifact {
    path: Option<TempPath>,
    display_path: PathBuf,
}

impl StagedArtifact {
    fn new(path: TempPath) -> Self {
        let display_path = path.to_path_buf();
        Self {
            path: Some(path),
            display_path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.display_path
    }

    pub fn is_released(&self) -> bool {
        self.path.is_none()
    }

    /// Current size of the backing file.
    pub async fn len(&self) -> io::Result<u64> {
        Ok(tokio::fs::metadata(self.path()).await?.len())
    }

    /// Remove the backing file. Calling it again, or after the file has
    /// already disappeared, is a no-op.
    pub fn release(&mut self) -> io::Result<()> {
        let Some(path) = self.path.take() else {
            return Ok(());
        };
        match path.close() {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Release and log instead of returning the error.
    pub(crate) fn release_logged(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!(
                error = %e,
                path = %self.display_path.display(),
                "Failed to remove staged artifact"
            );
        }
    }
}

/// Creates staged artifacts in one directory with a byte ceiling.
#[derive(Debug, Clone)]
pub struct TransientStore {
    dir: PathBuf,
    max_bytes: u64,
}

impl TransientStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    /// Create an empty, uniquely named staging file.
    pub fn allocate(&self) -> Result<StagedArtifact, PipelineError> {
        let (_, artifact) = self.create()?;
        Ok(artifact)
    }

    /// Copy `body` to a fresh staging file.
    ///
    /// Fails with `PayloadTooLarge` as soon as more than `max_bytes` have been
    /// read; the partial file is removed.
    pub async fn stage<R>(&self, body: R) -> Result<StagedArtifact, PipelineError>
    where
        R: AsyncRead + Unpin,
    {
        let (file, artifact) = self.create()?;
        let mut file = tokio::fs::File::from_std(file);
        let mut limited = body.take(self.max_bytes + 1);

        let copied = tokio::io::copy(&mut limited, &mut file)
            .await
            .map_err(|e| self.copy_error(e))?;

        if copied > self.max_bytes {
            return Err(PipelineError::PayloadTooLarge {
                limit_bytes: self.max_bytes,
            });
        }

        file.flush().await.map_err(PipelineError::Transfer)?;
        file.sync_all().await.map_err(PipelineError::Transfer)?;

        tracing::debug!(
            path = %artifact.path().display(),
            size_bytes = copied,
            "Upload staged"
        );

        Ok(artifact)
    }

    fn create(&self) -> Result<(std::fs::File, StagedArtifact), PipelineError> {
        let suffix = format!(".{}", VIDEO_EXTENSION);
        let named = tempfile::Builder::new()
            .prefix(STAGING_FILE_PREFIX)
            .suffix(&suffix)
            .tempfile_in(&self.dir)
            .map_err(PipelineError::Transfer)?;
        let (file, path) = named.into_parts();
        Ok((file, StagedArtifact::new(path)))
    }

    fn copy_error(&self, err: io::Error) -> PipelineError {
        let over_limit = err
            .get_ref()
            .map(|inner| inner.is::<BodyLimitExceeded>())
            .unwrap_or(false);
        if over_limit {
            PipelineError::PayloadTooLarge {
                limit_bytes: self.max_bytes,
            }
        } else {
            PipelineError::Transfer(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_stage_copies_body() {
        let dir = tempfile::tempdir().unwrap();
        let store = TransientStore::new(dir.path(), 1024);

        let artifact = store.stage(&b"fake mp4 bytes"[..]).await.unwrap();
        let name = artifact.path().file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("tubely-upload-"));
        assert!(name.ends_with(".mp4"));
        assert_eq!(artifact.len().await.unwrap(), 14);
        assert_eq!(std::fs::read(artifact.path()).unwrap(), b"fake mp4 bytes");
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = TransientStore::new(dir.path(), 1024);

        let mut artifact = store.stage(&b"abc"[..]).await.unwrap();
        std::fs::remove_file(artifact.path()).unwrap();
        artifact.release().unwrap();
        artifact.release().unwrap();
        assert!(artifact.is_released());
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = TransientStore::new(dir.path(), 1024);
        {
            let _artifact = store.stage(&b"abc"[..]).await.unwrap();
            assert_eq!(entries(dir.path()), 1);
        }
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_oversized_body_rejected_and_cleaned() {
        let dir = tempfile::tempdir().unwrap();
        let store = TransientStore::new(dir.path(), 8);

        let exact = store.stage(&[0u8; 8][..]).await;
        assert!(exact.is_ok());
        drop(exact);

        let result = store.stage(&[0u8; 9][..]).await;
        assert!(matches!(
            result,
            Err(PipelineError::PayloadTooLarge { limit_bytes: 8 })
        ));
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_body_limit_marker_maps_to_payload_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let store = TransientStore::new(dir.path(), 1024);

        let err = io::Error::new(io::ErrorKind::Other, BodyLimitExceeded);
        assert!(matches!(
            store.copy_error(err),
            PipelineError::PayloadTooLarge { .. }
        ));
        let err = io::Error::new(io::ErrorKind::UnexpectedEof, "client went away");
        assert!(matches!(store.copy_error(err), PipelineError::Transfer(_)));
    }

    #[tokio::test]
    async fn test_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = TransientStore::new(dir.path(), 1024);
        let a = store.allocate().unwrap();
        let b = store.allocate().unwrap();
        assert_ne!(a.path(), b.path());
    }
}
