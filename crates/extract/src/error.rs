//! Extraction Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The file could not be opened or read as a ZIP container.
    #[display("cannot read EPUB container: {}", _0.display())]
    Container(#[error(not(source))] PathBuf),
    /// The container holds no OPF package document.
    #[display("no OPF package document in container")]
    MissingPackage,
    /// The package document exists but is not well-formed XML.
    #[display("malformed OPF package document")]
    MalformedPackage,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The container is either readable or it's not.
        false
    }
}
