//! Configuration module
//!
//! Server, database, authentication, storage and ingestion settings are read
//! from the environment once at startup and shared read-only afterwards.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{DEFAULT_JWT_ISSUER, VIDEO_CONTENT_TYPE};
use crate::storage_types::{LocatorStrategy, StorageBackend};

const SERVER_PORT: u16 = 8091;
const MAX_CONNECTIONS: u32 = 10;
const MAX_VIDEO_SIZE_MB: usize = 1024;
const MAX_CONCURRENT_TRANSCODES: usize = 2;
const PRESIGNED_URL_TTL_SECS: u64 = 3600;
const ASPECT_TOLERANCE: f64 = 0.01;

/// How the aspect classifier compares a reduced ratio against its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToleranceMode {
    /// `|ratio - target| <= tolerance`
    Absolute,
    /// `|ratio - target| / target <= tolerance`
    Relative,
}

impl FromStr for ToleranceMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "absolute" => Ok(ToleranceMode::Absolute),
            "relative" => Ok(ToleranceMode::Relative),
            other => Err(anyhow::anyhow!("Invalid aspect tolerance mode: {}", other)),
        }
    }
}

/// Settings shared by every HTTP-facing process
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_issuer: String,
}

/// Storage and ingestion settings
#[derive(Clone, Debug)]
pub struct IngestConfig {
    pub database_url: String,
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub public_base_url: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub locator_strategy: LocatorStrategy,
    pub max_video_size_bytes: usize,
    pub video_allowed_content_types: Vec<String>,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub max_concurrent_transcodes: usize,
    pub upload_temp_dir: PathBuf,
    pub aspect_tolerance: f64,
    pub aspect_tolerance_mode: ToleranceMode,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub ingest: IngestConfig,
}

impl Config {
    /// Load from the process environment, honouring a `.env` file if present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an explicit variable map instead of the process environment.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let base = BaseConfig {
            server_port: lookup("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            jwt_secret: lookup("JWT_SECRET")
                .ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            jwt_issuer: lookup("JWT_ISSUER").unwrap_or_else(|| DEFAULT_JWT_ISSUER.to_string()),
        };

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };

        let presigned_ttl = Duration::from_secs(
            lookup("PRESIGNED_URL_TTL_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(PRESIGNED_URL_TTL_SECS),
        );
        let locator_strategy = LocatorStrategy::parse(
            &lookup("VIDEO_LOCATOR_STRATEGY").unwrap_or_else(|| "public".to_string()),
            presigned_ttl,
        )?;

        let aspect_tolerance_mode = match lookup("ASPECT_TOLERANCE_MODE") {
            Some(value) => value.parse::<ToleranceMode>()?,
            None => ToleranceMode::Absolute,
        };

        let max_video_size_bytes = lookup("MAX_VIDEO_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_VIDEO_SIZE_MB)
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_VIDEO_SIZE_MB is too large"))?;

        let ingest = IngestConfig {
            database_url: lookup("DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            s3_bucket: lookup("S3_BUCKET"),
            s3_region: lookup("S3_REGION").or_else(|| lookup("AWS_REGION")),
            s3_endpoint: lookup("S3_ENDPOINT"),
            public_base_url: lookup("PUBLIC_BASE_URL"),
            local_storage_path: lookup("LOCAL_STORAGE_PATH"),
            local_storage_base_url: lookup("LOCAL_STORAGE_BASE_URL"),
            locator_strategy,
            max_video_size_bytes,
            video_allowed_content_types: lookup("VIDEO_ALLOWED_CONTENT_TYPES")
                .unwrap_or_else(|| VIDEO_CONTENT_TYPE.to_string())
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            ffmpeg_path: lookup("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            ffprobe_path: lookup("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
            max_concurrent_transcodes: lookup("MAX_CONCURRENT_TRANSCODES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONCURRENT_TRANSCODES),
            upload_temp_dir: lookup("UPLOAD_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            aspect_tolerance: lookup("ASPECT_TOLERANCE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(ASPECT_TOLERANCE),
            aspect_tolerance_mode,
        };

        Ok(Config { base, ingest })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !self.ingest.database_url.starts_with("postgres://")
            && !self.ingest.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.ingest.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_MB must be greater than zero"));
        }

        if self.ingest.max_concurrent_transcodes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_TRANSCODES must be greater than zero"
            ));
        }

        if !(self.ingest.aspect_tolerance.is_finite() && self.ingest.aspect_tolerance >= 0.0) {
            return Err(anyhow::anyhow!(
                "ASPECT_TOLERANCE must be a non-negative number"
            ));
        }

        if self.ingest.video_allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "VIDEO_ALLOWED_CONTENT_TYPES must list at least one content type"
            ));
        }

        match self.ingest.storage_backend {
            StorageBackend::S3 => {
                if self.ingest.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.ingest.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.ingest.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.ingest.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
                if matches!(
                    self.ingest.locator_strategy,
                    LocatorStrategy::Presigned { .. }
                ) {
                    return Err(anyhow::anyhow!(
                        "VIDEO_LOCATOR_STRATEGY=presigned requires the S3 storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn db_max_connections(&self) -> u32 {
        self.base.db_max_connections
    }

    pub fn jwt_secret(&self) -> &str {
        &self.base.jwt_secret
    }

    pub fn jwt_issuer(&self) -> &str {
        &self.base.jwt_issuer
    }

    pub fn database_url(&self) -> &str {
        &self.ingest.database_url
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.ingest.storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.ingest.s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.ingest.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.ingest.s3_endpoint.as_deref()
    }

    pub fn public_base_url(&self) -> Option<&str> {
        self.ingest.public_base_url.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.ingest.local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.ingest.local_storage_base_url.as_deref()
    }

    pub fn locator_strategy(&self) -> LocatorStrategy {
        self.ingest.locator_strategy
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.ingest.max_video_size_bytes
    }

    pub fn video_allowed_content_types(&self) -> &[String] {
        &self.ingest.video_allowed_content_types
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.ingest.ffmpeg_path
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.ingest.ffprobe_path
    }

    pub fn max_concurrent_transcodes(&self) -> usize {
        self.ingest.max_concurrent_transcodes
    }

    pub fn upload_temp_dir(&self) -> &PathBuf {
        &self.ingest.upload_temp_dir
    }

    pub fn aspect_tolerance(&self) -> f64 {
        self.ingest.aspect_tolerance
    }

    pub fn aspect_tolerance_mode(&self) -> ToleranceMode {
        self.ingest.aspect_tolerance_mode
    }
}
