//! Error types for the recoverable failure cases.
//!
//! None of these ever escape a `tick()`; callers log and fall back.

use std::path::PathBuf;

use thiserror::Error;

/// Stage catalogue lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    /// Stage number outside `1..=MAX_STAGE`.
    #[error("no such stage: {stage}")]
    NoSuchStage {
        /// Requested stage number.
        stage: u32,
    },
}

/// A single malformed line in the score file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreLineError {
    /// Line has no name or no score.
    #[error("expected `NAME SCORE`, found {found} field(s)")]
    MissingField {
        /// Number of whitespace-separated fields seen.
        found: usize,
    },
    /// Line has trailing fields after the score.
    #[error("unexpected trailing field `{field}`")]
    ExtraField {
        /// First unexpected field.
        field: String,
    },
    /// Score field is not a non-negative integer.
    #[error("invalid score `{value}`")]
    BadScore {
        /// Offending text.
        value: String,
    },
}

/// Score file I/O failures.
#[derive(Debug, Error)]
pub enum ScoreFileError {
    /// Reading or writing the file failed.
    #[error("score file {path}: {source}")]
    Io {
        /// File that was accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Settings file failures.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Reading or writing the file failed.
    #[error("settings file {path}: {source}")]
    Io {
        /// File that was accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The JSON did not match the settings schema.
    #[error("invalid settings json: {0}")]
    Json(#[from] serde_json::Error),
}
