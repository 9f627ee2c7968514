//! Single-file transcodes
//!
//! Each [`Transcode`] variant maps to one ffmpeg command line. Resizes always
//! force the exact target resolution; aspect ratio is not preserved.

use crate::invoker::{CommandSpec, ProcessInvoker};
use ffmedia_core::constants::{
    MAX_IMAGE_QUALITY, MIN_IMAGE_QUALITY, QSCALE_BEST, QSCALE_WORST, VIDEO_AUDIO_BITRATE,
};
use ffmedia_core::ToolError;
use std::ffi::OsString;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// x264 encoder speed presets, fastest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum X264Preset {
    Ultrafast,
    Superfast,
    Veryfast,
    Faster,
    Fast,
    Medium,
    Slow,
    Slower,
    Veryslow,
}

impl X264Preset {
    pub const NAMES: &'static [&'static str] = &[
        "ultrafast",
        "superfast",
        "veryfast",
        "faster",
        "fast",
        "medium",
        "slow",
        "slower",
        "veryslow",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            X264Preset::Ultrafast => "ultrafast",
            X264Preset::Superfast => "superfast",
            X264Preset::Veryfast => "veryfast",
            X264Preset::Faster => "faster",
            X264Preset::Fast => "fast",
            X264Preset::Medium => "medium",
            X264Preset::Slow => "slow",
            X264Preset::Slower => "slower",
            X264Preset::Veryslow => "veryslow",
        }
    }
}

impl FromStr for X264Preset {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ultrafast" => Ok(X264Preset::Ultrafast),
            "superfast" => Ok(X264Preset::Superfast),
            "veryfast" => Ok(X264Preset::Veryfast),
            "faster" => Ok(X264Preset::Faster),
            "fast" => Ok(X264Preset::Fast),
            "medium" => Ok(X264Preset::Medium),
            "slow" => Ok(X264Preset::Slow),
            "slower" => Ok(X264Preset::Slower),
            "veryslow" => Ok(X264Preset::Veryslow),
            other => Err(ToolError::invalid(
                "preset",
                format!("unknown preset '{}'", other),
            )),
        }
    }
}

/// Maps quality 1..=100 linearly onto ffmpeg's qscale 31..=2 (lower qscale is better).
pub fn quality_to_qscale(quality: u8) -> i64 {
    let quality = i64::from(quality).clamp(MIN_IMAGE_QUALITY, MAX_IMAGE_QUALITY);
    let span_in = MAX_IMAGE_QUALITY - MIN_IMAGE_QUALITY;
    let span_out = QSCALE_WORST - QSCALE_BEST;
    let steps = ((quality - MIN_IMAGE_QUALITY) * span_out + span_in / 2) / span_in;
    QSCALE_WORST - steps
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcode {
    CompressImage { quality: u8 },
    ConvertImage,
    ResizeImage { width: u32, height: u32 },
    CompressVideo { crf: u8, preset: X264Preset },
    ConvertVideo,
    ResizeVideo { width: u32, height: u32 },
}

impl Transcode {
    pub fn name(&self) -> &'static str {
        match self {
            Transcode::CompressImage { .. } => "compress_image",
            Transcode::ConvertImage => "convert_image_format",
            Transcode::ResizeImage { .. } => "resize_image",
            Transcode::CompressVideo { .. } => "compress_video",
            Transcode::ConvertVideo => "convert_video_format",
            Transcode::ResizeVideo { .. } => "resize_video",
        }
    }

    /// Human-readable label used in result messages
    pub fn label(&self) -> &'static str {
        match self {
            Transcode::CompressImage { .. } => "Image compression",
            Transcode::ConvertImage => "Image format conversion",
            Transcode::ResizeImage { .. } => "Image resize",
            Transcode::CompressVideo { .. } => "Video compression",
            Transcode::ConvertVideo => "Video format conversion",
            Transcode::ResizeVideo { .. } => "Video resize",
        }
    }

    /// Target resolution for resizes.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            Transcode::ResizeImage { width, height } | Transcode::ResizeVideo { width, height } => {
                Some((*width, *height))
            }
            _ => None,
        }
    }

    /// ffmpeg arguments: `-y -i <input> [flags] <output>`. Paths are passed through untouched.
    pub fn args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), input.into()];

        let flags: Vec<String> = match self {
            Transcode::CompressImage { quality } => {
                vec!["-q:v".into(), quality_to_qscale(*quality).to_string()]
            }
            Transcode::ResizeImage { width, height } => {
                vec!["-vf".into(), format!("scale={}:{}", width, height)]
            }
            Transcode::CompressVideo { crf, preset } => vec![
                "-c:v".into(),
                "libx264".into(),
                "-crf".into(),
                crf.to_string(),
                "-preset".into(),
                preset.as_str().into(),
                "-c:a".into(),
                "aac".into(),
                "-b:a".into(),
                VIDEO_AUDIO_BITRATE.into(),
            ],
            Transcode::ResizeVideo { width, height } => vec![
                "-vf".into(),
                format!("scale={}:{}", width, height),
                "-c:a".into(),
                "copy".into(),
            ],
            Transcode::ConvertImage | Transcode::ConvertVideo => Vec::new(),
        };

        args.extend(flags.into_iter().map(OsString::from));
        args.push(output.into());
        args
    }
}

/// Runs single-file transcodes through ffmpeg
#[derive(Clone)]
pub struct Transcoder {
    invoker: Arc<dyn ProcessInvoker>,
    ffmpeg_path: String,
    timeout: Option<Duration>,
}

impl Transcoder {
    pub fn new(
        invoker: Arc<dyn ProcessInvoker>,
        ffmpeg_path: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            invoker,
            ffmpeg_path: ffmpeg_path.into(),
            timeout,
        }
    }

    /// Transcode `input` into `output`, creating `output`'s parent directories first.
    #[tracing::instrument(skip(self, input, output, transcode), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = transcode.name(),
        input = %input.display(),
        output = %output.display()
    ))]
    pub async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        transcode: &Transcode,
    ) -> Result<(), ToolError> {
        let start = std::time::Instant::now();

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let command = CommandSpec::new(&self.ffmpeg_path).args(transcode.args(input, output));
        let result = self.invoker.run(&command, self.timeout).await?;

        if !result.success() {
            tracing::debug!(stderr = %result.stderr_lossy(), "ffmpeg stderr");
            return Err(ToolError::ExecutionFailure(
                result.failure_reason(&self.ffmpeg_path),
            ));
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            "Transcode completed"
        );
        Ok(())
    }
}
