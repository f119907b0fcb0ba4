//! Metadata enrichment.
//!
//! Combines EPUB-embedded metadata with the Google Books volumes service:
//! the book is identified by ISBN when the container carries one, falling
//! back to a title+author query, and the answer both fills gaps in the
//! embedded metadata and yields a genre via the category mapping. All
//! lookups are rate-limited and cached on disk, one book at a time.

mod cache;
mod client;
pub mod error;
mod genre_map;

pub use crate::cache::QueryCache;
pub use crate::client::{GoogleBooksClient, VolumeInfo};
pub use crate::genre_map::{CategoryMapper, CategoryRule, default_table};

use crate::error::Result;
use buchfink_extract::BookMetadata;
use serde::Serialize;
use tracing::info;

/// A book's metadata after the enrichment pass.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedBook {
    /// Embedded metadata, with gaps filled from the service answer.
    pub metadata: BookMetadata,
    /// The raw service answer, when one was found.
    pub google: Option<VolumeInfo>,
    /// Genre mapped from the service categories; the sentinel label when
    /// unmapped.
    pub genre: String,
}

/// Looks up and merges external metadata for one book at a time.
pub struct Enricher {
    client: GoogleBooksClient,
    mapper: CategoryMapper,
    sentinel: String,
}

impl Enricher {
    pub fn new(client: GoogleBooksClient, mapper: CategoryMapper, sentinel: impl Into<String>) -> Self {
        Self { client, mapper, sentinel: sentinel.into() }
    }

    /// Enriches one book's embedded metadata.
    ///
    /// The ISBN query runs first when one is present; a miss falls back to
    /// title+author. Service-side "no such book" is a normal outcome: the
    /// result then carries the embedded metadata untouched and the sentinel
    /// genre.
    pub async fn enrich(&self, metadata: BookMetadata) -> Result<EnrichedBook> {
        let mut volume = match metadata.isbn() {
            Some(isbn) => self.client.lookup(Some(isbn), "", "").await?,
            None => None,
        };
        if volume.is_none() && !metadata.title.is_empty() {
            let author = metadata.primary_author().unwrap_or_default();
            volume = self.client.lookup(None, &metadata.title, author).await?;
        }

        let genre = volume
            .as_ref()
            .and_then(|info| self.mapper.map(&info.categories))
            .unwrap_or_else(|| self.sentinel.clone());
        let metadata = merge(metadata, volume.as_ref());
        if let Some(info) = &volume {
            info!(title = %info.title, genre = %genre, "enriched from Google Books");
        }
        Ok(EnrichedBook { metadata, google: volume, genre })
    }

    /// Applies the precedence rule for the final genre: the enrichment
    /// result wins only when it is not the sentinel label.
    pub fn preferred_genre<'a>(&self, keyword_genre: &'a str, enriched_genre: &'a str) -> &'a str {
        if enriched_genre == self.sentinel { keyword_genre } else { enriched_genre }
    }
}

/// Fills empty embedded fields from the service answer. Embedded values
/// always win when present.
fn merge(mut metadata: BookMetadata, volume: Option<&VolumeInfo>) -> BookMetadata {
    let Some(info) = volume else {
        return metadata;
    };
    if metadata.title.is_empty() {
        metadata.title = info.title.clone();
    }
    if metadata.authors.is_empty() {
        metadata.authors = info.authors.clone();
    }
    if metadata.publisher.is_empty() {
        metadata.publisher = info.publisher.clone();
    }
    if metadata.published.is_empty() {
        metadata.published = info.published_date.clone();
    }
    if metadata.description.is_empty() {
        metadata.description = info.description.clone();
    }
    metadata
}
