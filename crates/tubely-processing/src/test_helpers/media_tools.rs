use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::video::tools::{MediaTools, ProbeReport, ProbeStream, ToolError};

/// Scripted [`MediaTools`].
///
/// `probe` returns a fixed report; `remux_faststart` copies the input to the
/// output byte for byte unless told to fail.
#[derive(Debug, Default)]
pub struct FakeMediaTools {
    report: ProbeReport,
    fail_probe: bool,
    fail_remux: bool,
    empty_output: bool,
    probe_calls: AtomicUsize,
    remux_calls: AtomicUsize,
}

impl FakeMediaTools {
    /// An audio track followed by one video stream of the given size.
    pub fn with_geometry(width: u32, height: u32) -> Self {
        Self::with_report(ProbeReport::new(vec![
            ProbeStream::audio(),
            ProbeStream::video(width, height),
        ]))
    }

    /// A container holding only audio.
    pub fn without_video() -> Self {
        Self::with_report(ProbeReport::new(vec![ProbeStream::audio()]))
    }

    pub fn with_report(report: ProbeReport) -> Self {
        Self {
            report,
            ..Default::default()
        }
    }

    pub fn failing_probe(mut self) -> Self {
        self.fail_probe = true;
        self
    }

    pub fn failing_remux(mut self) -> Self {
        self.fail_remux = true;
        self
    }

    /// Remux "succeeds" without writing anything.
    pub fn empty_remux_output(mut self) -> Self {
        self.empty_output = true;
        self
    }

    pub fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    pub fn remux_calls(&self) -> usize {
        self.remux_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaTools for FakeMediaTools {
    async fn probe(&self, input: &Path) -> Result<ProbeReport, ToolError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_probe {
            return Err(ToolError::Failed {
                tool: "ffprobe",
                status: "exit status: 1".to_string(),
                stderr: format!("{}: Invalid data found when processing input", input.display()),
            });
        }
        Ok(self.report.clone())
    }

    async fn remux_faststart(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        self.remux_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_remux {
            return Err(ToolError::Failed {
                tool: "ffmpeg",
                status: "exit status: 1".to_string(),
                stderr: "moov atom not found".to_string(),
            });
        }
        if self.empty_output {
            return Ok(());
        }
        tokio::fs::copy(input, output)
            .await
            .map_err(|source| ToolError::Spawn {
                tool: "ffmpeg",
                source,
            })?;
        Ok(())
    }
}
