//! Error types for the [`scan`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A scan error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for scan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a scan failure.
///
/// Scan failures never abort the walk; they are yielded per-entry so the
/// caller can log the skipped path and move on.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A directory could not be listed.
    #[display("cannot list directory: {}", _0.display())]
    ReadDir(#[error(not(source))] PathBuf),
    /// A file's metadata could not be read.
    #[display("cannot stat file: {}", _0.display())]
    Stat(#[error(not(source))] PathBuf),
    /// Underlying I/O error.
    #[display("I/O error: {_0}")]
    Io(IoError),
}

impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
