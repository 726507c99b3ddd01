//! Error type shared by every decoder in the crate
//!
//! Each variant carries the file it was raised for, plus a record index
//! (binary streams) or a field name (text header) so a failure can be
//! traced back to the exact spot in the snapshot.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Snapshot directory or an expected file does not exist
    #[error("path not found: {}", path.display())]
    PathNotFound { path: PathBuf },

    /// Header file ended before this field's line
    #[error("{}: missing header field `{field}`", path.display())]
    MissingField { path: PathBuf, field: &'static str },

    /// Header line (or file-name suffix) failed numeric conversion
    #[error("{}: cannot parse `{field}` from {value:?}", path.display())]
    ParseError {
        path: PathBuf,
        field: &'static str,
        value: String,
    },

    /// Record framing violation or premature end of stream
    #[error("{}: malformed record #{record}: {reason}", path.display())]
    MalformedRecord {
        path: PathBuf,
        record: usize,
        reason: String,
    },

    /// Record length disagrees with a previously declared count
    #[error("{}: record #{record} ({field}) holds {found} values, expected {expected}", path.display())]
    DimensionMismatch {
        path: PathBuf,
        record: usize,
        field: &'static str,
        expected: usize,
        found: usize,
    },

    /// Reader configuration could not be deserialized
    #[error("{}: invalid configuration: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
