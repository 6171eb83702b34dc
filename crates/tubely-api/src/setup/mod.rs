//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tubely_core::Config;

/// Initialize the application: tracing, config checks, database, storage,
/// the ingestion pipeline and the router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router)> {
    crate::telemetry::init_telemetry(config.is_production())?;

    validation::validate_config(&config)?;

    tracing::info!(
        environment = config.environment(),
        storage_backend = %config.storage_backend(),
        "Starting Tubely API"
    );

    let pool = database::setup_database(&config).await?;

    let state = Arc::new(services::setup_services(config, pool).await?);

    let app = routes::setup_routes(state.clone());

    Ok((state, app))
}
