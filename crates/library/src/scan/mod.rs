//! Collection scanning.
//!
//! Walks a root directory and yields one [`EbookRecord`] per accepted ebook
//! file, with the author/title parsed from the filename and a genre assigned
//! by the keyword classifier. Hidden entries (any `.`-prefixed path segment)
//! and reader-sidecar directories (`*.sdr`) are skipped.
//!
//! Scan order is a filesystem artifact: downstream stages must not depend on
//! it for correctness, only for display ordering (which re-sorts explicitly).

pub(crate) mod error;
mod stream;

pub use self::stream::{ScanEvent, scan, scan_records};
