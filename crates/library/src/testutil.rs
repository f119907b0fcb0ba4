//! Shared fixtures for unit tests.

use crate::record::{BookFormat, EbookRecord};
use std::path::PathBuf;
use time::OffsetDateTime;

/// A minimal in-memory record, rooted under a fictional `/books` tree.
pub(crate) fn record(name: &str, author: &str, title: &str, format: BookFormat, size: u64) -> EbookRecord {
    record_with_genre(name, author, title, "Sonstiges", format, size)
}

pub(crate) fn record_with_genre(
    name: &str,
    author: &str,
    title: &str,
    genre: &str,
    format: BookFormat,
    size: u64,
) -> EbookRecord {
    EbookRecord {
        source_path: PathBuf::from("/books").join(name),
        relative_path: PathBuf::from(name),
        format,
        size_bytes: size,
        modified: OffsetDateTime::UNIX_EPOCH,
        author: author.to_string(),
        title: title.to_string(),
        genre: genre.to_string(),
    }
}
