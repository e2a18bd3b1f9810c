use super::TimestampToken;
use crate::media::{MediaFile, MediaKind};
use crate::reader::{
    MetadataReader, TagMap, TAG_CREATION_TIME, TAG_DATE, TAG_DATE_TIME_ORIGINAL, TAG_TIME_OF_DAY,
};

/// Timestamp recorded inside the file, if any. Every failure (missing tag,
/// garbage value, reader error) is reported and turned into `None`.
pub fn read(file: &MediaFile, reader: &dyn MetadataReader) -> Option<TimestampToken> {
    let tags = match reader.read_tags(&file.path, file.kind) {
        Ok(tags) => tags,
        Err(err) => {
            tracing::warn!(file = %file.filename, error = %err, "could not read metadata");
            return None;
        }
    };

    let Some(digits) = digits_for(file.kind, &tags) else {
        tracing::warn!(file = %file.filename, kind = ?file.kind, "no timestamp in metadata");
        return None;
    };

    match TimestampToken::from_digits(&digits) {
        Ok(token) => {
            tracing::debug!(file = %file.filename, token = %token, "timestamp found in metadata");
            Some(token)
        }
        Err(err) => {
            tracing::warn!(file = %file.filename, error = %err, "unusable timestamp in metadata");
            None
        }
    }
}

/// Raw tags -> digit string, per media kind.
pub fn digits_for(kind: MediaKind, tags: &TagMap) -> Option<String> {
    match kind {
        // 2023:04:01 15:30:00
        MediaKind::Image => tags.get(TAG_DATE_TIME_ORIGINAL).map(|v| only_digits(v)),
        // date="2023-04-01", ICRT="15:30:00"
        MediaKind::InterleavedVideo => {
            let date = tags.get(TAG_DATE)?;
            let time = tags.get(TAG_TIME_OF_DAY)?;
            Some(only_digits(date) + &only_digits(time))
        }
        // 2023-04-01T15:30:00.000000Z, fraction and zone dropped
        MediaKind::ContainerVideo => tags.get(TAG_CREATION_TIME).map(|v| {
            let whole_seconds = v.split('.').next().unwrap_or(v);
            only_digits(whole_seconds)
        }),
        MediaKind::Unrecognized => None,
    }
}

fn only_digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}
