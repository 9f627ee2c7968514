//! Defaults and fixed values for the transcoding tools.

/// Default image quality (1-100).
pub const DEFAULT_IMAGE_QUALITY: i64 = 85;
pub const MIN_IMAGE_QUALITY: i64 = 1;
pub const MAX_IMAGE_QUALITY: i64 = 100;

/// Default x264 constant rate factor.
pub const DEFAULT_VIDEO_CRF: i64 = 23;
pub const MIN_VIDEO_CRF: i64 = 18;
pub const MAX_VIDEO_CRF: i64 = 28;

/// Default x264 preset name.
pub const DEFAULT_VIDEO_PRESET: &str = "medium";

/// Audio bitrate used when re-encoding the audio track of a compressed video.
pub const VIDEO_AUDIO_BITRATE: &str = "128k";

/// ffmpeg qscale bounds (lower is better).
pub const QSCALE_BEST: i64 = 2;
pub const QSCALE_WORST: i64 = 31;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tiff", "webp"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v"];

pub const SERVER_NAME: &str = "ffmedia-mcp";
