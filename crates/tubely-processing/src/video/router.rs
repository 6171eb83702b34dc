use std::sync::Arc;

use tubely_core::models::AspectClass;
use tubely_storage::{RemoteKey, Storage};

use super::staging::StagedArtifact;
use crate::error::PipelineError;

/// Object Router: picks the remote key and moves the artifact there.
#[derive(Clone)]
pub struct ObjectRouter {
    storage: Arc<dyn Storage>,
    content_type: String,
}

impl ObjectRouter {
    pub fn new(storage: Arc<dyn Storage>, content_type: impl Into<String>) -> Self {
        Self {
            storage,
            content_type: content_type.into(),
        }
    }

    pub fn route(&self, class: AspectClass) -> RemoteKey {
        RemoteKey::generate(class)
    }

    /// Upload `artifact` under `key` and return its locator.
    pub async fn upload(
        &self,
        artifact: &StagedArtifact,
        key: &RemoteKey,
    ) -> Result<String, PipelineError> {
        let key = key.to_string();
        self.storage
            .upload_file(&key, artifact.path(), &self.content_type)
            .await?;
        let locator = self.storage.locator(&key).await?;
        Ok(locator)
    }

    /// Best-effort removal of an object that will not be referenced.
    pub async fn discard(&self, key: &RemoteKey) {
        let key = key.to_string();
        match self.storage.delete(&key).await {
            Ok(()) => tracing::info!(key = %key, "Removed orphaned remote object"),
            Err(e) => tracing::error!(
                error = %e,
                key = %key,
                "Failed to remove orphaned remote object"
            ),
        }
    }
}
