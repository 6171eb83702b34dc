//! ffprobe/ffmpeg backed [`MediaTools`].

use async_trait::async_trait;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;

use super::tools::{MediaTools, ProbeReport, ToolError};

/// Validate that a path doesn't contain shell metacharacters or dangerous sequences.
///
/// Only applied to the configured executables. Input and output paths are
/// passed as separate arguments and never reach a shell.
fn validate_path(path: &str) -> Result<(), ToolError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(ToolError::InvalidPath(format!(
            "path contains dangerous characters: {}",
            path
        )));
    }

    if path.contains("..") {
        return Err(ToolError::InvalidPath(format!(
            "path contains directory traversal: {}",
            path
        )));
    }

    Ok(())
}

fn validate_executable(path: &str) -> Result<(), ToolError> {
    validate_path(path)?;
    if path.is_empty()
        || !path.chars().all(|c| {
            c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\'
        })
    {
        return Err(ToolError::InvalidPath(format!(
            "executable path contains unsafe characters: {}",
            path
        )));
    }
    Ok(())
}

fn check_status(tool: &'static str, output: &Output) -> Result<(), ToolError> {
    if output.status.success() {
        return Ok(());
    }
    Err(ToolError::Failed {
        tool,
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// Runs the ffprobe and ffmpeg executables.
///
/// Child processes are killed if the calling future is dropped.
#[derive(Debug, Clone)]
pub struct FfmpegTools {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl FfmpegTools {
    pub fn new(ffmpeg_path: String, ffprobe_path: String) -> Result<Self, ToolError> {
        validate_executable(&ffmpeg_path)?;
        validate_executable(&ffprobe_path)?;
        Ok(Self {
            ffmpeg_path,
            ffprobe_path,
        })
    }

    fn probe_args(input: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_entries".to_string(),
            "stream=index,codec_type,width,height".to_string(),
            input.to_string_lossy().to_string(),
        ]
    }

    fn remux_args(input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-nostdin".to_string(),
            "-v".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-map".to_string(),
            "0".to_string(),
            "-c".to_string(),
            "copy".to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            "-f".to_string(),
            "mp4".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl MediaTools for FfmpegTools {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe(&self, input: &Path) -> Result<ProbeReport, ToolError> {
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args(Self::probe_args(input))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ToolError::Spawn {
                tool: "ffprobe",
                source,
            })?;

        check_status("ffprobe", &output)?;
        let report = ProbeReport::from_json(&output.stdout)?;

        tracing::debug!(
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            streams = report.streams.len(),
            "Probe completed"
        );

        Ok(report)
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "remux_faststart"
    ))]
    async fn remux_faststart(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        let start = std::time::Instant::now();

        let result = Command::new(&self.ffmpeg_path)
            .args(Self::remux_args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ToolError::Spawn {
                tool: "ffmpeg",
                source,
            })?;

        check_status("ffmpeg", &result)?;

        tracing::debug!(
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remux completed"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_rejects_unsafe_executables() {
        assert!(FfmpegTools::new("ffmpeg".into(), "ffprobe".into()).is_ok());
        assert!(FfmpegTools::new("/usr/bin/ffmpeg".into(), "/usr/bin/ffprobe".into()).is_ok());
        assert!(FfmpegTools::new("ffmpeg; rm -rf /".into(), "ffprobe".into()).is_err());
        assert!(FfmpegTools::new("ffmpeg".into(), "$(ffprobe)".into()).is_err());
        assert!(FfmpegTools::new("".into(), "ffprobe".into()).is_err());
    }

    #[test]
    fn test_remux_args_copy_streams() {
        let args = FfmpegTools::remux_args(
            &PathBuf::from("/tmp/in.mp4"),
            &PathBuf::from("/tmp/out.mp4"),
        );
        let joined = args.join(" ");
        assert!(joined.contains("-c copy"));
        assert!(joined.contains("-map 0"));
        assert!(joined.contains("-movflags +faststart"));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/out.mp4"));
    }

    #[test]
    fn test_probe_args_request_stream_entries() {
        let args = FfmpegTools::probe_args(&PathBuf::from("/tmp/in.mp4"));
        assert!(args.contains(&"json".to_string()));
        assert!(args.contains(&"stream=index,codec_type,width,height".to_string()));
    }

    #[tokio::test]
    async fn test_missing_executable_is_spawn_error() {
        let tools = FfmpegTools::new(
            "tubely-missing-ffmpeg".into(),
            "tubely-missing-ffprobe".into(),
        )
        .unwrap();
        let result = tools.probe(&PathBuf::from("/tmp/in.mp4")).await;
        assert!(matches!(result, Err(ToolError::Spawn { .. })));
    }

    #[tokio::test]
    async fn test_staging_paths_with_shell_characters_reach_the_tool() {
        let tools = FfmpegTools::new(
            "tubely-missing-ffmpeg".into(),
            "tubely-missing-ffprobe".into(),
        )
        .unwrap();
        let input = PathBuf::from("/srv/uploads (staging) & co/upload-1.mp4");
        let output = PathBuf::from("/srv/uploads (staging) & co/upload-1.faststart.mp4");

        let probed = tools.probe(&input).await;
        assert!(matches!(probed, Err(ToolError::Spawn { tool: "ffprobe", .. })));

        let remuxed = tools.remux_faststart(&input, &output).await;
        assert!(matches!(remuxed, Err(ToolError::Spawn { tool: "ffmpeg", .. })));
    }
}
