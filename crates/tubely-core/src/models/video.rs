use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A video metadata record owned by one principal.
///
/// `video_url` stays `None` until an upload has been ingested and routed to
/// remote storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct VideoRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoRecord {
    pub fn is_owned_by(&self, principal: Uuid) -> bool {
        self.user_id == principal
    }

    /// Attach a remote locator and refresh the update timestamp.
    pub fn attach_locator(&mut self, locator: String) {
        self.video_url = Some(locator);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(owner: Uuid) -> VideoRecord {
        let now = Utc::now();
        VideoRecord {
            id: Uuid::new_v4(),
            user_id: owner,
            title: "Boots".to_string(),
            description: "A pair of boots".to_string(),
            thumbnail_url: None,
            video_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_is_owned_by() {
        let owner = Uuid::new_v4();
        let video = record(owner);
        assert!(video.is_owned_by(owner));
        assert!(!video.is_owned_by(Uuid::new_v4()));
    }

    #[test]
    fn test_attach_locator_refreshes_timestamp() {
        let mut video = record(Uuid::new_v4());
        let before = video.updated_at;
        video.attach_locator("https://cdn.example.com/landscape/a.mp4".to_string());
        assert_eq!(
            video.video_url.as_deref(),
            Some("https://cdn.example.com/landscape/a.mp4")
        );
        assert!(video.updated_at >= before);
        assert_eq!(video.created_at, before);
    }
}
