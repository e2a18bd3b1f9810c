use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("file type not recognized for {file}")]
    UnrecognizedKind { file: String },

    #[error("no valid timestamp for {file} and no earlier timestamp to fall back on")]
    NoTimestamp { file: String },

    #[error("invalid description: {0}")]
    Description(#[from] DescriptionError),

    #[error("prompt input closed while waiting for an answer")]
    PromptClosed,

    #[error("refusing to overwrite existing file {0}")]
    TargetExists(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A digit string that cannot become a timestamp token.
#[derive(Debug, Error, PartialEq)]
pub enum TokenError {
    #[error("expected 14 digits, got {0:?}")]
    Shape(String),

    #[error("{0:?} is not a valid calendar date-time")]
    Calendar(String),
}

/// Failure of the external metadata reader. Never fatal; the file is
/// treated as having no metadata timestamp.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("no metadata reader for this media kind")]
    Unsupported,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("EXIF error: {0}")]
    Exif(#[from] exif::Error),

    #[error("ffprobe exited with {0}")]
    Probe(std::process::ExitStatus),

    #[error("ffprobe output is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum DescriptionError {
    #[error("only letters, digits and - . _ ~ are allowed in strict mode, got {0:?}")]
    Strict(String),

    #[error("do not use / : ' \" or control characters in descriptions, got {0:?}")]
    Reserved(String),
}
