//! Configuration validation
//!
//! Fails fast at startup on configuration that would break ingestion later.

use anyhow::Result;
use tubely_core::{Config, LocatorStrategy, StorageBackend};

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let is_production = config.is_production();
    let env_var = std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .ok();

    // Error rendering reads the process environment, not Config
    if is_production && env_var.is_none() {
        tracing::warn!(
            "Production mode detected but ENVIRONMENT/APP_ENV not set - error details may leak"
        );
    }

    if is_production && config.storage_backend() == StorageBackend::Local {
        tracing::warn!("Local storage backend in production - videos are served from local disk");
    }

    if let LocatorStrategy::Presigned { expires_in } = config.locator_strategy() {
        if expires_in.as_secs() == 0 {
            return Err(anyhow::anyhow!(
                "PRESIGNED_URL_TTL_SECS must be greater than zero"
            ));
        }
    }

    Ok(())
}
