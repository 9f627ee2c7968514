//! Dispatcher
//!
//! Resolves a tool name against the registry, validates the arguments, checks
//! that input paths exist and then runs exactly one operation. Every outcome,
//! including validation failures, comes back as an [`InvocationResult`].

use crate::registry::{OperationDescriptor, OperationKind, OperationRegistry, PathRole, ValidatedArgs};
use ffmedia_core::{Config, InvocationResult, LogLevel, MediaKind, ToolError};
use ffmedia_processing::{BatchRunner, MediaProbe, ProcessInvoker, Transcode, Transcoder, X264Preset};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

const AVAILABLE_MESSAGE: &str = "FFmpeg is installed and available";
const UNAVAILABLE_MESSAGE: &str =
    "FFmpeg is not installed or not available. Install FFmpeg or set FFMPEG_PATH";

/// A fully-typed request, built only from validated arguments
#[derive(Debug, Clone, PartialEq)]
enum Operation {
    Transcode {
        input: PathBuf,
        output: PathBuf,
        transcode: Transcode,
    },
    Batch {
        input_dir: PathBuf,
        output_dir: PathBuf,
        kind: MediaKind,
        transcode: Transcode,
    },
    MediaInfo {
        path: PathBuf,
    },
    CheckStatus,
}

impl Operation {
    fn from_args(kind: OperationKind, args: &ValidatedArgs) -> Result<Self, ToolError> {
        let single = |transcode: Transcode| -> Result<Operation, ToolError> {
            Ok(Operation::Transcode {
                input: args.path("input_path")?,
                output: args.path("output_path")?,
                transcode,
            })
        };
        let batch = |kind: MediaKind, transcode: Transcode| -> Result<Operation, ToolError> {
            Ok(Operation::Batch {
                input_dir: args.path("input_dir")?,
                output_dir: args.path("output_dir")?,
                kind,
                transcode,
            })
        };

        match kind {
            OperationKind::CompressImage => single(Transcode::CompressImage {
                quality: args.u8("quality")?,
            }),
            OperationKind::BatchCompressImages => batch(
                MediaKind::Image,
                Transcode::CompressImage {
                    quality: args.u8("quality")?,
                },
            ),
            OperationKind::ConvertImageFormat => {
                require_extension(&args.path("output_path")?)?;
                single(Transcode::ConvertImage)
            }
            OperationKind::ResizeImage => single(Transcode::ResizeImage {
                width: args.u32("width")?,
                height: args.u32("height")?,
            }),
            OperationKind::CompressVideo => single(video_compression(args)?),
            OperationKind::BatchCompressVideos => batch(MediaKind::Video, video_compression(args)?),
            OperationKind::ConvertVideoFormat => {
                require_extension(&args.path("output_path")?)?;
                single(Transcode::ConvertVideo)
            }
            OperationKind::ResizeVideo => single(Transcode::ResizeVideo {
                width: args.u32("width")?,
                height: args.u32("height")?,
            }),
            OperationKind::GetMediaInfo => Ok(Operation::MediaInfo {
                path: args.path("file_path")?,
            }),
            OperationKind::CheckFfmpegStatus => Ok(Operation::CheckStatus),
        }
    }
}

fn video_compression(args: &ValidatedArgs) -> Result<Transcode, ToolError> {
    Ok(Transcode::CompressVideo {
        crf: args.u8("crf")?,
        preset: args.str("preset")?.parse::<X264Preset>()?,
    })
}

fn require_extension(output: &Path) -> Result<(), ToolError> {
    match output.extension() {
        Some(ext) if !ext.is_empty() => Ok(()),
        _ => Err(ToolError::invalid(
            "output_path",
            "must have a file extension to infer the target format",
        )),
    }
}

/// Existence and file-vs-directory checks for every input path.
async fn check_inputs(
    descriptor: &OperationDescriptor,
    args: &ValidatedArgs,
) -> Result<(), ToolError> {
    for (param, role) in descriptor.input_params() {
        let path = args.path(param.name)?;
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ToolError::InputNotFound(path));
            }
            Err(e) => return Err(e.into()),
        };
        match role {
            PathRole::InputDir if !metadata.is_dir() => {
                return Err(ToolError::invalid(param.name, "expected a directory"));
            }
            PathRole::InputFile if metadata.is_dir() => {
                return Err(ToolError::invalid(param.name, "expected a file, found a directory"));
            }
            _ => {}
        }
    }
    Ok(())
}

pub struct Dispatcher {
    registry: Arc<OperationRegistry>,
    transcoder: Transcoder,
    probe: MediaProbe,
    batch: BatchRunner,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<OperationRegistry>,
        invoker: Arc<dyn ProcessInvoker>,
        config: &Config,
    ) -> Self {
        let transcoder = Transcoder::new(
            invoker.clone(),
            config.ffmpeg_path.clone(),
            config.transcode_timeout(),
        );
        let probe = MediaProbe::new(
            invoker,
            config.ffmpeg_path.clone(),
            config.ffprobe_path.clone(),
            config.probe_timeout(),
            config.availability_timeout(),
        );
        let batch = BatchRunner::new(transcoder.clone(), config.batch_concurrency);

        Self {
            registry,
            transcoder,
            probe,
            batch,
        }
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub fn probe(&self) -> &MediaProbe {
        &self.probe
    }

    /// Run the operation registered under `name`. Never panics on bad input.
    pub async fn dispatch(&self, name: &str, arguments: &Map<String, Value>) -> InvocationResult {
        let start = Instant::now();
        let result = InvocationResult::from(self.try_dispatch(name, arguments).await);
        let elapsed_ms = start.elapsed().as_millis();

        match result.error() {
            None => tracing::info!(operation = %name, elapsed_ms, "Operation succeeded"),
            Some(err) => match err.log_level() {
                LogLevel::Debug => tracing::debug!(
                    operation = %name,
                    error_code = err.error_code(),
                    error = %err,
                    elapsed_ms,
                    "Operation rejected"
                ),
                LogLevel::Warn => tracing::warn!(
                    operation = %name,
                    error_code = err.error_code(),
                    error = %err,
                    elapsed_ms,
                    "Operation failed"
                ),
            },
        }
        result
    }

    async fn try_dispatch(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<String, ToolError> {
        let descriptor = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::UnknownOperation(name.to_string()))?;

        let args = descriptor.validate(arguments)?;
        let operation = Operation::from_args(descriptor.kind, &args)?;
        check_inputs(descriptor, &args).await?;

        self.execute(operation).await
    }

    async fn execute(&self, operation: Operation) -> Result<String, ToolError> {
        match operation {
            Operation::Transcode {
                input,
                output,
                transcode,
            } => self.run_transcode(&input, &output, &transcode).await,
            Operation::Batch {
                input_dir,
                output_dir,
                kind,
                transcode,
            } => {
                let result = self
                    .batch
                    .run(&input_dir, &output_dir, kind, &transcode)
                    .await?;
                Ok(result.summary(batch_title(kind)))
            }
            Operation::MediaInfo { path } => {
                let info = self.probe.media_info(&path).await?;
                serde_json::to_string_pretty(&info)
                    .map_err(|e| ToolError::ProbeFailure(e.to_string()))
            }
            Operation::CheckStatus => Ok(if self.probe.ffmpeg_available().await {
                AVAILABLE_MESSAGE.to_string()
            } else {
                UNAVAILABLE_MESSAGE.to_string()
            }),
        }
    }

    async fn run_transcode(
        &self,
        input: &Path,
        output: &Path,
        transcode: &Transcode,
    ) -> Result<String, ToolError> {
        let label = transcode.label();
        match self.transcoder.transcode(input, output, transcode).await {
            Ok(()) => {
                let mut message = format!(
                    "{} succeeded: {} -> {}",
                    label,
                    input.display(),
                    output.display()
                );
                if let Some((width, height)) = transcode.dimensions() {
                    message.push_str(&format!(" ({}x{})", width, height));
                }
                Ok(message)
            }
            Err(ToolError::ExecutionFailure(reason)) => Err(ToolError::ExecutionFailure(format!(
                "{} failed: {} ({})",
                label,
                input.display(),
                reason
            ))),
            Err(other) => Err(other),
        }
    }
}

fn batch_title(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "Batch image compression",
        MediaKind::Video => "Batch video compression",
    }
}
