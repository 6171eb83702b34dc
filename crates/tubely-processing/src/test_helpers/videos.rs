use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tubely_core::models::VideoRecord;
use tubely_core::AppError;
use tubely_db::VideoRepositoryTrait;
use uuid::Uuid;

/// Video records kept in a map.
#[derive(Debug, Clone, Default)]
pub struct MemoryVideoRepository {
    videos: Arc<Mutex<HashMap<Uuid, VideoRecord>>>,
    fail_updates: Arc<AtomicBool>,
    vanish_on_update: Arc<AtomicBool>,
    get_calls: Arc<AtomicUsize>,
    update_calls: Arc<AtomicUsize>,
}

impl MemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every update fails with a database-style error.
    pub fn failing_updates(self) -> Self {
        self.fail_updates.store(true, Ordering::SeqCst);
        self
    }

    /// The record is deleted just before each update lands, as if removed concurrently.
    pub fn vanishing_updates(self) -> Self {
        self.vanish_on_update.store(true, Ordering::SeqCst);
        self
    }

    /// Insert a fresh record owned by `owner` and return it.
    pub fn insert_for(&self, owner: Uuid) -> VideoRecord {
        let now = Utc::now();
        let video = VideoRecord {
            id: Uuid::new_v4(),
            user_id: owner,
            title: "Boot camp".to_string(),
            description: "Walking through the basics".to_string(),
            thumbnail_url: None,
            video_url: None,
            created_at: now,
            updated_at: now,
        };
        if let Ok(mut videos) = self.videos.lock() {
            videos.insert(video.id, video.clone());
        }
        video
    }

    pub fn get(&self, id: Uuid) -> Option<VideoRecord> {
        self.videos.lock().ok().and_then(|v| v.get(&id).cloned())
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoRepositoryTrait for MemoryVideoRepository {
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.get(id))
    }

    async fn update_video(&self, video: &VideoRecord) -> Result<VideoRecord, AppError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Internal("connection reset by peer".to_string()));
        }
        let mut videos = self
            .videos
            .lock()
            .map_err(|_| AppError::Internal("video map lock poisoned".to_string()))?;
        if self.vanish_on_update.load(Ordering::SeqCst) {
            videos.remove(&video.id);
        }
        match videos.get_mut(&video.id) {
            Some(stored) => {
                *stored = video.clone();
                Ok(video.clone())
            }
            None => Err(AppError::NotFound(format!("Video {} not found", video.id))),
        }
    }
}
