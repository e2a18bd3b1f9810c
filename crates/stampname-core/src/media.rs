use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How timestamps are stored inside a file, decided from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaKind {
    /// JPEG with an EXIF `DateTimeOriginal` tag
    Image,
    /// AVI with separate `date` / `ICRT` tags
    InterleavedVideo,
    /// MP4 / QuickTime with a combined `creation_time` tag
    ContainerVideo,
    Unrecognized,
}

impl MediaKind {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => MediaKind::Image,
            "avi" => MediaKind::InterleavedVideo,
            "mp4" | "mov" => MediaKind::ContainerVideo,
            _ => MediaKind::Unrecognized,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaFile {
    /// Full path of the file before renaming
    pub path: PathBuf,
    /// File name including extension
    pub filename: String,
    /// File name without extension
    pub stem: String,
    /// Extension with leading dot, original case kept (empty if none)
    pub extension: String,
    pub kind: MediaKind,
}

impl MediaFile {
    pub fn new(dir: &Path, filename: &str) -> Self {
        let as_path = Path::new(filename);
        let stem = as_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(filename)
            .to_string();
        let ext = as_path.extension().and_then(|s| s.to_str()).unwrap_or("");
        let extension = if ext.is_empty() {
            String::new()
        } else {
            format!(".{}", ext)
        };

        Self {
            path: dir.join(filename),
            filename: filename.to_string(),
            stem,
            extension,
            kind: MediaKind::from_extension(ext),
        }
    }
}
