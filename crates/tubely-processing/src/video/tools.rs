//! External media tool capability.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors raised by an external media tool.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid tool path: {0}")]
    InvalidPath(String),

    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: &'static str,
        status: String,
        stderr: String,
    },

    #[error("malformed {tool} output: {message}")]
    MalformedOutput { tool: &'static str, message: String },
}

/// One entry of a probe report's stream list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProbeStream {
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub codec_type: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl ProbeStream {
    pub fn video(width: u32, height: u32) -> Self {
        Self {
            index: None,
            codec_type: Some("video".to_string()),
            width: Some(width),
            height: Some(height),
        }
    }

    pub fn audio() -> Self {
        Self {
            codec_type: Some("audio".to_string()),
            ..Default::default()
        }
    }

    pub fn is_video(&self) -> bool {
        self.codec_type.as_deref() == Some("video")
    }
}

/// Structured description of a media file's streams.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProbeReport {
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
}

impl ProbeReport {
    pub fn new(streams: Vec<ProbeStream>) -> Self {
        Self { streams }
    }

    /// Parse ffprobe's `-print_format json` output.
    pub fn from_json(raw: &[u8]) -> Result<Self, ToolError> {
        serde_json::from_slice(raw).map_err(|e| ToolError::MalformedOutput {
            tool: "ffprobe",
            message: e.to_string(),
        })
    }
}

/// Container inspection and lossless remux.
///
/// The production implementation shells out to ffprobe/ffmpeg; tests inject
/// a fake.
#[async_trait]
pub trait MediaTools: Send + Sync {
    /// Describe the streams in the file at `input`.
    async fn probe(&self, input: &Path) -> Result<ProbeReport, ToolError>;

    /// Copy every stream of `input` into `output` unchanged, moving the
    /// container index to the front of the file.
    async fn remux_faststart(&self, input: &Path, output: &Path) -> Result<(), ToolError>;
}
