use std::sync::Arc;

use tokio::sync::Semaphore;

use super::staging::{StagedArtifact, TransientStore};
use super::tools::MediaTools;
use crate::error::PipelineError;

/// Container Optimizer: lossless fast-start remux into a new staged artifact.
///
/// A shared semaphore caps how many remux processes run at once across all
/// pipelines using this optimizer.
#[derive(Clone)]
pub struct ContainerOptimizer {
    tools: Arc<dyn MediaTools>,
    store: TransientStore,
    permits: Arc<Semaphore>,
}

impl ContainerOptimizer {
    pub fn new(tools: Arc<dyn MediaTools>, store: TransientStore, max_concurrent: usize) -> Self {
        Self {
            tools,
            store,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Remux `source` into a fresh artifact.
    ///
    /// On success `source` is released and only the returned artifact remains.
    /// On failure `source` is left untouched and the partial output is removed.
    pub async fn optimize(
        &self,
        source: &mut StagedArtifact,
    ) -> Result<StagedArtifact, PipelineError> {
        let output = self.store.allocate()?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| PipelineError::TranscodeFailure(e.to_string()))?;

        self.tools
            .remux_faststart(source.path(), output.path())
            .await
            .map_err(|e| PipelineError::TranscodeFailure(e.to_string()))?;

        let size = output.len().await.unwrap_or(0);
        if size == 0 {
            return Err(PipelineError::TranscodeFailure(
                "remux produced no output".to_string(),
            ));
        }

        source.release_logged();
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::FakeMediaTools;

    fn entries(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_optimize_replaces_source() {
        let dir = tempfile::tempdir().unwrap();
        let store = TransientStore::new(dir.path(), 1024);
        let tools = Arc::new(FakeMediaTools::with_geometry(1920, 1080));
        let optimizer = ContainerOptimizer::new(tools.clone(), store.clone(), 2);

        let mut source = store.stage(&b"moov-at-end"[..]).await.unwrap();
        let optimized = optimizer.optimize(&mut source).await.unwrap();

        assert!(source.is_released());
        assert_eq!(std::fs::read(optimized.path()).unwrap(), b"moov-at-end");
        assert_eq!(entries(dir.path()), 1);
        assert_eq!(tools.remux_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_remux_keeps_source() {
        let dir = tempfile::tempdir().unwrap();
        let store = TransientStore::new(dir.path(), 1024);
        let tools = Arc::new(FakeMediaTools::with_geometry(1920, 1080).failing_remux());
        let optimizer = ContainerOptimizer::new(tools, store.clone(), 1);

        let mut source = store.stage(&b"data"[..]).await.unwrap();
        let result = optimizer.optimize(&mut source).await;

        assert!(matches!(result, Err(PipelineError::TranscodeFailure(_))));
        assert!(!source.is_released());
        assert!(source.path().exists());
        assert_eq!(entries(dir.path()), 1);
    }

    #[tokio::test]
    async fn test_empty_output_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = TransientStore::new(dir.path(), 1024);
        let tools = Arc::new(FakeMediaTools::with_geometry(1920, 1080).empty_remux_output());
        let optimizer = ContainerOptimizer::new(tools, store.clone(), 1);

        let mut source = store.stage(&b"data"[..]).await.unwrap();
        let result = optimizer.optimize(&mut source).await;

        assert!(matches!(result, Err(PipelineError::TranscodeFailure(_))));
        assert_eq!(entries(dir.path()), 1);
    }
}
