use std::path::Path;

use crate::constants::{IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};

/// Media family a batch operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => IMAGE_EXTENSIONS,
            MediaKind::Video => VIDEO_EXTENSIONS,
        }
    }

    /// Whether the final extension of `path` belongs to this kind (case-insensitive).
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.extensions()
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extension_matching_ignores_case() {
        assert!(MediaKind::Image.matches(Path::new("A.JPG")));
        assert!(MediaKind::Image.matches(Path::new("a.jpg")));
        assert!(MediaKind::Image.matches(Path::new("/photos/scan.Tiff")));
        assert!(!MediaKind::Image.matches(Path::new("a.jpgx")));
        assert!(!MediaKind::Image.matches(Path::new("jpg")));
        assert!(!MediaKind::Image.matches(Path::new("clip.mp4")));
    }

    #[test]
    fn test_video_extension_matching() {
        assert!(MediaKind::Video.matches(Path::new("clip.M4V")));
        assert!(MediaKind::Video.matches(Path::new("movie.mkv")));
        assert!(!MediaKind::Video.matches(Path::new("movie.mkv.part")));
        assert!(!MediaKind::Video.matches(Path::new("notes.txt")));
    }
}
