use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::Command;

use exif::{In, Reader, Tag, Value};

use crate::error::MetadataError;
use crate::media::MediaKind;

/// Raw tag name -> raw tag value, exactly as the underlying tool reported them.
pub type TagMap = BTreeMap<String, String>;

/// EXIF original capture time (`YYYY:MM:DD HH:MM:SS`)
pub const TAG_DATE_TIME_ORIGINAL: &str = "DateTimeOriginal";
/// RIFF/AVI capture date
pub const TAG_DATE: &str = "date";
/// RIFF/AVI creation time of day
pub const TAG_TIME_OF_DAY: &str = "ICRT";
/// QuickTime/MP4 combined creation timestamp
pub const TAG_CREATION_TIME: &str = "creation_time";

/// Source of raw timestamp tags for a file.
pub trait MetadataReader {
    fn read_tags(&self, path: &Path, kind: MediaKind) -> Result<TagMap, MetadataError>;
}

/// Reads EXIF in-process and asks `ffprobe` about videos.
#[derive(Debug, Clone)]
pub struct ExternalReader {
    ffprobe: PathBuf,
}

impl Default for ExternalReader {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl ExternalReader {
    pub fn new(ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
        }
    }

    fn read_exif(&self, path: &Path) -> Result<TagMap, MetadataError> {
        let mut reader = BufReader::new(File::open(path)?);
        let exif = Reader::new().read_from_container(&mut reader)?;

        let mut tags = TagMap::new();
        if let Some(field) = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY) {
            // Prefer the raw ASCII; display_value() rewrites the separators.
            let raw = match &field.value {
                Value::Ascii(parts) if !parts.is_empty() => {
                    String::from_utf8_lossy(&parts[0]).into_owned()
                }
                _ => field.display_value().to_string(),
            };
            tags.insert(TAG_DATE_TIME_ORIGINAL.to_string(), raw);
        }
        Ok(tags)
    }

    fn read_ffprobe(&self, path: &Path) -> Result<TagMap, MetadataError> {
        let output = Command::new(&self.ffprobe)
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(path)
            .output()?;

        if !output.status.success() {
            return Err(MetadataError::Probe(output.status));
        }

        let parsed: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        Ok(flatten_format_tags(&parsed))
    }
}

impl MetadataReader for ExternalReader {
    fn read_tags(&self, path: &Path, kind: MediaKind) -> Result<TagMap, MetadataError> {
        match kind {
            MediaKind::Image => self.read_exif(path),
            MediaKind::InterleavedVideo | MediaKind::ContainerVideo => self.read_ffprobe(path),
            MediaKind::Unrecognized => Err(MetadataError::Unsupported),
        }
    }
}

/// Pull `format.tags` out of ffprobe's JSON. Non-string values are kept in
/// their JSON spelling.
fn flatten_format_tags(parsed: &serde_json::Value) -> TagMap {
    let Some(tags) = parsed
        .get("format")
        .and_then(|f| f.get("tags"))
        .and_then(|t| t.as_object())
    else {
        return TagMap::new();
    };

    tags.iter()
        .map(|(k, v)| {
            let value = v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());
            (k.clone(), value)
        })
        .collect()
}
