use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use super::TimestampToken;
use crate::media::{MediaFile, MediaKind};

/// What a file name says about its timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "token", rename_all = "kebab-case")]
pub enum NameParse {
    Found(TimestampToken),
    Absent,
    /// The name is already in the output shape; the file is left alone.
    AlreadyCanonical,
}

static RE_BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{8})_([0-9]{6})").unwrap());
static RE_PREFIXED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{3}_([0-9]{8})_([0-9]{6})").unwrap());
static RE_PERIODS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2}) ([0-9]{2})\.([0-9]{2})\.([0-9]{2})").unwrap()
});
static RE_CANONICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})[ _]([0-9]{2})-([0-9]{2})-([0-9]{2})").unwrap()
});
static RE_CANONICAL_PARTIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}[ _]WA[0-9]{4}").unwrap());
static RE_WHATSAPP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"IMG-([0-9]{8})-WA([0-9]{4})").unwrap());

static RE_SONY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^DSC").unwrap());
static RE_LIVE_PHOTO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^IMG_[0-9]{4}$").unwrap());

/// Recover a timestamp from a file stem. Patterns are tried in a fixed
/// order; canonical shapes come before the looser digit patterns so that
/// running twice over the same directory never transforms a name twice.
pub fn parse(stem: &str) -> NameParse {
    // 20230401_153000 (most Android cameras)
    if let Some(caps) = RE_BARE.captures(stem) {
        return complete(stem, &format!("{}{}", &caps[1], &caps[2]));
    }
    // IMG_20230401_153000, VID_…, PXL_…
    if let Some(caps) = RE_PREFIXED.captures(stem) {
        return complete(stem, &format!("{}{}", &caps[1], &caps[2]));
    }
    // 2023-04-01 15.30.00, written by older releases
    if let Some(caps) = RE_PERIODS.captures(stem) {
        let digits: String = (1..=6).map(|i| &caps[i]).collect();
        tracing::debug!(file = stem, "name written by an older release, re-deriving");
        return complete(stem, &digits);
    }
    if RE_CANONICAL.is_match(stem) || RE_CANONICAL_PARTIAL.is_match(stem) {
        tracing::info!(file = stem, "already renamed, leaving it alone");
        return NameParse::AlreadyCanonical;
    }
    // IMG-20230401-WA0007 only carries a date and a sequence number
    if let Some(caps) = RE_WHATSAPP.captures(stem) {
        return match TimestampToken::partial(&caps[1], &caps[2]) {
            Ok(token) => {
                tracing::warn!(file = stem, token = %token, "incomplete timestamp in name, messaging-app file?");
                NameParse::Found(token)
            }
            Err(err) => {
                tracing::warn!(file = stem, error = %err, "unusable date in messaging-app name");
                NameParse::Absent
            }
        };
    }

    tracing::info!(file = stem, "no timestamp recoverable from name");
    NameParse::Absent
}

/// Timestamp carried by a name that is already in the complete output
/// shape. Partial (`WA####`) names and impossible dates give `None`.
pub fn canonical_stamp(stem: &str) -> Option<TimestampToken> {
    let caps = RE_CANONICAL.captures(stem)?;
    let digits: String = (1..=6).map(|i| &caps[i]).collect();
    TimestampToken::from_digits(&digits).ok()
}

fn complete(stem: &str, digits: &str) -> NameParse {
    match TimestampToken::from_digits(digits) {
        Ok(token) => {
            tracing::debug!(file = stem, token = %token, "timestamp found in name");
            NameParse::Found(token)
        }
        Err(err) => {
            tracing::warn!(file = stem, error = %err, "name looks like a timestamp but is not one");
            NameParse::Absent
        }
    }
}

/// Camera naming schemes whose metadata deserves a second look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceHint {
    /// `DSC…`: EXIF is there, but the camera clock is often unset
    SonyCybershot,
    /// `IMG_####.MOV`: the clip of an iPhone Live Photo
    LivePhoto,
}

/// Recognize (and log) well-known camera naming schemes.
pub fn source_hint(file: &MediaFile) -> Option<SourceHint> {
    if RE_SONY.is_match(&file.stem) {
        tracing::debug!(
            file = %file.filename,
            "probably from a Sony Cybershot; EXIF should be present but the camera clock is often unset"
        );
        Some(SourceHint::SonyCybershot)
    } else if file.kind == MediaKind::ContainerVideo && RE_LIVE_PHOTO.is_match(&file.stem) {
        tracing::warn!(
            file = %file.filename,
            "probably an iPhone Live Photo clip; its metadata may be wrong"
        );
        Some(SourceHint::LivePhoto)
    } else {
        None
    }
}
