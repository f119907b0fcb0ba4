//! On-disk query cache.
//!
//! Every Google Books query is cached as one pretty-printed JSON file keyed
//! by the sanitized query string, so re-running enrichment over a collection
//! costs one network call per *new* book only. The cache is plain files on
//! purpose: it can be inspected, pruned or deleted with ordinary tools.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// A key→JSON file store under a single directory.
#[derive(Debug, Clone)]
pub struct QueryCache {
    dir: PathBuf,
}

impl QueryCache {
    /// Opens (and creates, if needed) a cache at `dir`.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.or_raise(|| ErrorKind::Cache)?;
        Ok(Self { dir })
    }

    /// The default per-user cache location
    /// (`~/.cache/buchfink/metadata` on Linux).
    pub fn default_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "buchfink").map(|dirs| dirs.cache_dir().join("metadata"))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }

    /// Returns the cached response for `key`, or `None` on a miss.
    ///
    /// A cache file that no longer parses is treated as a miss, not an
    /// error — it will simply be rewritten by the next [`put`](Self::put).
    pub async fn get(&self, key: &str) -> Option<Value> {
        let path = self.path_for(key);
        let bytes = fs::read(&path).await.ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                debug!(key, "query cache hit");
                Some(value)
            },
            Err(e) => {
                debug!(key, error = %e, "discarding unreadable cache entry");
                None
            },
        }
    }

    /// Stores a response under `key`, overwriting any previous entry.
    pub async fn put(&self, key: &str, value: &Value) -> Result<()> {
        let path = self.path_for(key);
        let body = serde_json::to_vec_pretty(value).or_raise(|| ErrorKind::Cache)?;
        fs::write(&path, body).await.or_raise(|| ErrorKind::Cache)?;
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Flattens a query string into a safe filename stem.
fn sanitize_key(key: &str) -> String {
    key.chars().map(|c| if matches!(c, ':' | '+' | ' ' | '/') { '_' } else { c }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = QueryCache::open(dir.path().join("metadata")).await.unwrap();
        assert_eq!(cache.get("isbn:123").await, None);

        let value = json!({"totalItems": 1});
        cache.put("isbn:123", &value).await.unwrap();
        assert_eq!(cache.get("isbn:123").await, Some(value));
    }

    #[tokio::test]
    async fn test_keys_become_safe_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let cache = QueryCache::open(dir.path()).await.unwrap();
        cache.put("intitle:Der Joker+inauthor:Fitzek", &json!({})).await.unwrap();
        assert!(dir.path().join("intitle_Der_Joker_inauthor_Fitzek.json").is_file());
    }

    #[tokio::test]
    async fn test_corrupt_entry_reads_as_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = QueryCache::open(dir.path()).await.unwrap();
        std::fs::write(dir.path().join("isbn_9.json"), b"{ not json").unwrap();
        assert_eq!(cache.get("isbn:9").await, None);
    }
}
