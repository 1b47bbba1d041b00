//! Error types for key file parsing and loading.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for key file operations.
pub type KeyResult<T> = Result<T, KeyError>;

/// Errors that can occur while reading, parsing or writing a key file.
///
/// Every variant is scoped to a single file: a loader skips the file and
/// keeps going.
#[derive(Debug, Error)]
pub enum KeyError {
    /// Failed to read the key file or directory.
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a key file.
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The first data line has no `0`/`1` field followed by a duration.
    #[error("No level column in '{path}' line {line}: {content}")]
    NoLevelColumn {
        path: PathBuf,
        line: usize,
        content: String,
    },

    /// A data line holds something other than `0` or `1` in the level column.
    #[error("Expected 0 or 1 but found '{found}' in '{path}' line {line}")]
    BadLevel {
        path: PathBuf,
        line: usize,
        found: String,
    },

    /// The field after the level is missing or not an unsigned integer.
    #[error("Invalid duration '{found}' in '{path}' line {line}")]
    BadDuration {
        path: PathBuf,
        line: usize,
        found: String,
    },

    /// The file has no data lines.
    #[error("No data lines in '{path}'")]
    Empty { path: PathBuf },
}
