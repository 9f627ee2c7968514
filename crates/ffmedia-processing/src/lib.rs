//! ffmedia Media Processing Library
//!
//! Runs ffmpeg/ffprobe as external processes: single-file transcodes, media
//! probing, availability checks and directory batches.

pub mod batch;
pub mod invoker;
pub mod probe;
pub mod transcode;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

// Re-export commonly used types
pub use batch::{list_media_files, BatchRunner};
pub use invoker::{CommandOutput, CommandSpec, InvokeError, ProcessInvoker, TokioInvoker};
pub use probe::MediaProbe;
pub use transcode::{quality_to_qscale, Transcode, Transcoder, X264Preset};
