//! Application state shared by every handler.

use std::sync::Arc;

use tubely_core::Config;
use tubely_processing::IngestionPipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: IngestionPipeline,
}

impl AppState {
    pub fn new(config: Config, pipeline: IngestionPipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline,
        }
    }
}
