//! Batch runner
//!
//! Applies one transcode to every media file directly inside a directory.
//! Per-file failures are recorded and never abort the batch.

use crate::transcode::{Transcode, Transcoder};
use ffmedia_core::{BatchResult, MediaKind, ToolError};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};

/// Regular files directly inside `dir` whose extension belongs to `kind`, sorted by name.
pub async fn list_media_files(dir: &Path, kind: MediaKind) -> Result<Vec<PathBuf>, ToolError> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ToolError::InputNotFound(dir.to_path_buf())
        } else {
            ToolError::from(e)
        }
    })?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !kind.matches(&path) {
            continue;
        }
        // metadata() follows symlinks
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if is_file {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

#[derive(Clone)]
pub struct BatchRunner {
    transcoder: Transcoder,
    concurrency: usize,
}

impl BatchRunner {
    /// `concurrency` of 1 processes files strictly one at a time.
    pub fn new(transcoder: Transcoder, concurrency: usize) -> Self {
        Self {
            transcoder,
            concurrency: concurrency.max(1),
        }
    }

    #[tracing::instrument(skip(self, source_dir, dest_dir, transcode), fields(
        batch.kind = %kind,
        ffmpeg.operation = transcode.name(),
        source_dir = %source_dir.display(),
        dest_dir = %dest_dir.display()
    ))]
    pub async fn run(
        &self,
        source_dir: &Path,
        dest_dir: &Path,
        kind: MediaKind,
        transcode: &Transcode,
    ) -> Result<BatchResult, ToolError> {
        let start = std::time::Instant::now();
        let files = list_media_files(source_dir, kind).await?;

        // The destination keeps the raw file name; the lossy form is only a label.
        let jobs: Vec<(PathBuf, PathBuf, String)> = files
            .into_iter()
            .filter_map(|path| {
                let file_name = path.file_name()?;
                let output = dest_dir.join(file_name);
                let label = file_name.to_string_lossy().into_owned();
                Some((path, output, label))
            })
            .collect();

        tracing::info!(files = jobs.len(), "Starting batch");

        let mut result = BatchResult {
            total: jobs.len(),
            ..Default::default()
        };

        let transcoder = &self.transcoder;
        // buffered() keeps results in enumeration order while running up to `concurrency` jobs
        let outcomes: Vec<(String, Result<(), ToolError>)> = stream::iter(jobs)
            .map(|(input, output, name)| async move {
                let outcome = transcoder.transcode(&input, &output, transcode).await;
                (name, outcome)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        for (name, outcome) in outcomes {
            match outcome {
                Ok(()) => result.record_success(name),
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "Batch item failed");
                    result.record_failure(name, e.to_string());
                }
            }
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            total = result.total,
            succeeded = result.succeeded.len(),
            failed = result.failed.len(),
            "Batch completed"
        );
        Ok(result)
    }
}
