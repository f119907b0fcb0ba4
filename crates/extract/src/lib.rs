//! EPUB metadata extraction.
//!
//! Reads the descriptive (Dublin Core) metadata embedded in EPUB package
//! documents: title, authors, publisher, dates, identifiers and subject
//! tags. The ZIP container and the XML inside it are both treated as
//! hostile input — anything that doesn't parse degrades to empty fields
//! rather than an error when callers use [`extract_or_default`].

pub mod error;
mod models;
mod opf;

pub use crate::models::BookMetadata;
pub use crate::opf::{extract, extract_or_default};
