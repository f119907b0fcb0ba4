//! Enrichment Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An enrichment error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for enrichment operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The HTTP request could not be sent or completed.
    #[display("network error")]
    Network,
    /// The service answered 429 twice in a row; back off and try later.
    #[display("rate limit exceeded")]
    RateLimited,
    /// Any other non-success status from the service.
    #[display("API error, status {_0}")]
    Api(#[error(not(source))] u16),
    /// The response body was not the JSON shape we expect.
    #[display("undecodable API response")]
    Decode,
    /// The on-disk query cache could not be read or written.
    #[display("query cache error")]
    Cache,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::RateLimited)
    }
}
