use std::sync::Arc;

use tubely_core::models::StreamGeometry;

use super::staging::StagedArtifact;
use super::tools::{MediaTools, ProbeReport};
use crate::error::PipelineError;

/// Geometry Prober: width and height of the first video stream.
#[derive(Clone)]
pub struct GeometryProber {
    tools: Arc<dyn MediaTools>,
}

impl GeometryProber {
    pub fn new(tools: Arc<dyn MediaTools>) -> Self {
        Self { tools }
    }

    pub async fn probe(&self, artifact: &StagedArtifact) -> Result<StreamGeometry, PipelineError> {
        let report = self
            .tools
            .probe(artifact.path())
            .await
            .map_err(PipelineError::ProbeFailure)?;
        geometry_from_report(&report)
    }
}

/// Select the first stream of kind "video" and read its dimensions.
pub fn geometry_from_report(report: &ProbeReport) -> Result<StreamGeometry, PipelineError> {
    let stream = report
        .streams
        .iter()
        .find(|s| s.is_video())
        .ok_or(PipelineError::NoVideoStream)?;

    let geometry = StreamGeometry::new(stream.width.unwrap_or(0), stream.height.unwrap_or(0));
    if !geometry.is_positive() {
        return Err(PipelineError::InvalidGeometry(geometry));
    }
    Ok(geometry)
}
