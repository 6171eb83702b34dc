use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tubely_storage::{Storage, StorageBackend, StorageError, StorageResult};

/// Object store kept in a map of key to (bytes, content type).
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    base_url: String,
    objects: Arc<Mutex<HashMap<String, (Vec<u8>, String)>>>,
    fail_uploads: bool,
    upload_calls: Arc<AtomicUsize>,
    delete_calls: Arc<AtomicUsize>,
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: Arc::new(Mutex::new(HashMap::new())),
            fail_uploads: false,
            upload_calls: Arc::new(AtomicUsize::new(0)),
            delete_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every upload is rejected as if by the store.
    pub fn failing_uploads(mut self) -> Self {
        self.fail_uploads = true;
        self
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    pub fn object(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects
            .lock()
            .ok()
            .and_then(|objects| objects.get(key).cloned())
    }

    fn poisoned() -> StorageError {
        StorageError::UploadFailed("memory storage lock poisoned".to_string())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn upload_file(
        &self,
        key: &str,
        source: &Path,
        content_type: &str,
    ) -> StorageResult<u64> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads {
            return Err(StorageError::UploadFailed("access denied".to_string()));
        }
        let data = tokio::fs::read(source).await?;
        let size = data.len() as u64;
        self.objects
            .lock()
            .map_err(|_| Self::poisoned())?
            .insert(key.to_string(), (data, content_type.to_string()));
        Ok(size)
    }

    async fn locator(&self, key: &str) -> StorageResult<String> {
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        match self
            .objects
            .lock()
            .map_err(|_| Self::poisoned())?
            .remove(key)
        {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound(key.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
