//! Media probe - metadata extraction and binary availability

use crate::invoker::{CommandSpec, InvokeError, ProcessInvoker};
use ffmedia_core::ToolError;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct MediaProbe {
    invoker: Arc<dyn ProcessInvoker>,
    ffmpeg_path: String,
    ffprobe_path: String,
    probe_timeout: Option<Duration>,
    availability_timeout: Duration,
}

impl MediaProbe {
    pub fn new(
        invoker: Arc<dyn ProcessInvoker>,
        ffmpeg_path: impl Into<String>,
        ffprobe_path: impl Into<String>,
        probe_timeout: Option<Duration>,
        availability_timeout: Duration,
    ) -> Self {
        Self {
            invoker,
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
            probe_timeout,
            availability_timeout,
        }
    }

    /// Full ffprobe report (format + streams), returned as-is.
    #[tracing::instrument(skip(self, path), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe",
        path = %path.display()
    ))]
    pub async fn media_info(&self, path: &Path) -> Result<serde_json::Value, ToolError> {
        let command = CommandSpec::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path);

        let output = self
            .invoker
            .run(&command, self.probe_timeout)
            .await
            .map_err(|e| match e {
                InvokeError::Timeout { .. } => ToolError::from(e),
                other => ToolError::ProbeFailure(other.to_string()),
            })?;

        if !output.success() {
            return Err(ToolError::ProbeFailure(output.stderr_lossy()));
        }

        let info: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| ToolError::ProbeFailure(format!("invalid ffprobe output: {}", e)))?;

        tracing::info!(
            streams = info["streams"].as_array().map(|s| s.len()).unwrap_or(0),
            "Media probe completed"
        );
        Ok(info)
    }

    /// Whether `ffmpeg -version` runs successfully. Never an error.
    pub async fn ffmpeg_available(&self) -> bool {
        let command = CommandSpec::new(&self.ffmpeg_path).arg("-version");
        match self
            .invoker
            .run(&command, Some(self.availability_timeout))
            .await
        {
            Ok(output) => output.success(),
            Err(e) => {
                tracing::warn!(error = %e, "ffmpeg availability check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::CommandOutput;
    use crate::test_support::MockInvoker;

    fn probe(invoker: Arc<MockInvoker>) -> MediaProbe {
        MediaProbe::new(
            invoker,
            "ffmpeg",
            "ffprobe",
            None,
            Duration::from_secs(10),
        )
    }

    #[tokio::test]
    async fn test_media_info_passes_document_through() {
        let doc = r#"{"format":{"format_name":"mov,mp4"},"streams":[{"codec_type":"video","width":640}]}"#;
        let invoker = Arc::new(MockInvoker::printing(doc));

        let info = probe(invoker.clone())
            .media_info(Path::new("clip.mp4"))
            .await
            .unwrap();

        assert_eq!(info["streams"][0]["width"], 640);
        assert_eq!(info["format"]["format_name"], "mov,mp4");
        let calls = invoker.calls();
        assert_eq!(calls[0].program, "ffprobe");
        assert_eq!(
            calls[0].args,
            vec![
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "clip.mp4"
            ]
        );
    }

    #[tokio::test]
    async fn test_probe_failure_surfaces_stderr() {
        let invoker = Arc::new(MockInvoker::new(|_| {
            Ok(CommandOutput {
                exit_code: Some(1),
                stdout: Vec::new(),
                stderr: b"clip.mp4: Invalid data found when processing input".to_vec(),
            })
        }));

        let err = probe(invoker)
            .media_info(Path::new("clip.mp4"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ToolError::ProbeFailure("clip.mp4: Invalid data found when processing input".to_string())
        );
    }

    #[tokio::test]
    async fn test_probe_rejects_garbage_output() {
        let invoker = Arc::new(MockInvoker::printing("not json"));
        let err = probe(invoker)
            .media_info(Path::new("clip.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ProbeFailure(msg) if msg.starts_with("invalid ffprobe output")));
    }

    #[tokio::test]
    async fn test_availability_is_boolean() {
        let ok = Arc::new(MockInvoker::succeeding());
        assert!(probe(ok.clone()).ffmpeg_available().await);
        assert_eq!(ok.calls()[0].args, vec!["-version"]);

        let broken = Arc::new(MockInvoker::exiting_with(127));
        assert!(!probe(broken).ffmpeg_available().await);

        let missing = Arc::new(MockInvoker::new(|cmd| {
            Err(InvokeError::Spawn {
                program: cmd.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        }));
        assert!(!probe(missing).ffmpeg_available().await);
    }
}
