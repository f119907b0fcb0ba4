//! Google Books volumes client.
//!
//! One query per book, strictly sequential: a shared rate limiter spaces
//! requests at least one interval apart, and a 429 answer earns a single
//! long-pause retry before giving up. Every successful response lands in
//! the [`QueryCache`] so repeated runs stay off the network.

use crate::cache::QueryCache;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

const VOLUMES_URL: &str = "https://www.googleapis.com/books/v1/volumes";
const USER_AGENT: &str = concat!("buchfink/", env!("CARGO_PKG_VERSION"));
/// Minimum spacing between requests.
const MIN_INTERVAL_MS: u64 = 1000;
/// Pause before the one retry after a 429.
const RATE_LIMIT_BACKOFF_SECS: u64 = 60;

/// Enforces a minimum interval between consecutive requests.
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self { last_request: Mutex::new(None), min_interval: Duration::from_millis(min_interval_ms) }
    }

    /// Sleeps until the interval since the previous request has elapsed.
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                debug!(?wait_time, "rate limiting");
                tokio::time::sleep(wait_time).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// The `volumeInfo` block of a Google Books volume.
///
/// Only the fields buchfink consumes are modelled; everything is defaulted
/// so partial responses deserialize cleanly.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeInfo {
    pub title: String,
    pub authors: Vec<String>,
    pub publisher: String,
    pub published_date: String,
    pub description: String,
    pub categories: Vec<String>,
    pub page_count: u32,
    pub language: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
struct Volume {
    volume_info: VolumeInfo,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
struct VolumesResponse {
    items: Vec<Volume>,
}

/// Builds the volumes query string: ISBN beats title+author beats bare
/// title; with none of them there is nothing to ask.
fn build_query(isbn: Option<&str>, title: &str, author: &str) -> Option<String> {
    match (isbn, title, author) {
        (Some(isbn), _, _) if !isbn.is_empty() => Some(format!("isbn:{isbn}")),
        (_, title, author) if !title.is_empty() && !author.is_empty() => {
            Some(format!("intitle:{title}+inauthor:{author}"))
        },
        (_, title, _) if !title.is_empty() => Some(format!("intitle:{title}")),
        _ => None,
    }
}

fn first_volume(response: VolumesResponse) -> Option<VolumeInfo> {
    response.items.into_iter().next().map(|volume| volume.volume_info)
}

/// Rate-limited, cached Google Books lookup client.
pub struct GoogleBooksClient {
    http: reqwest::Client,
    limiter: RateLimiter,
    cache: QueryCache,
}

impl GoogleBooksClient {
    pub fn new(cache: QueryCache) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .or_raise(|| ErrorKind::Network)?;
        Ok(Self { http, limiter: RateLimiter::new(MIN_INTERVAL_MS), cache })
    }

    /// Looks up the best-matching volume for a book.
    ///
    /// Identification preference is ISBN, then title+author, then bare
    /// title. `Ok(None)` means "nothing to identify the book by" or "the
    /// service knows no such book" — both are normal outcomes, not errors.
    pub async fn lookup(&self, isbn: Option<&str>, title: &str, author: &str) -> Result<Option<VolumeInfo>> {
        let Some(query) = build_query(isbn, title, author) else {
            return Ok(None);
        };

        if let Some(cached) = self.cache.get(&query).await {
            let response: VolumesResponse = serde_json::from_value(cached).or_raise(|| ErrorKind::Decode)?;
            return Ok(first_volume(response));
        }

        let body = self.fetch(&query, true).await?;
        // A failed cache write only costs a future network call.
        if let Err(e) = self.cache.put(&query, &body).await {
            warn!(query, error = %e, "could not cache API response");
        }
        let response: VolumesResponse = serde_json::from_value(body).or_raise(|| ErrorKind::Decode)?;
        Ok(first_volume(response))
    }

    /// Performs the rate-limited HTTP request, with a single long-pause
    /// retry on HTTP 429.
    async fn fetch(&self, query: &str, retry: bool) -> Result<Value> {
        self.limiter.wait().await;
        debug!(query, "querying Google Books");
        let response = self
            .http
            .get(VOLUMES_URL)
            .query(&[("q", query), ("maxResults", "1")])
            .send()
            .await
            .or_raise(|| ErrorKind::Network)?;
        let status = response.status();
        if status.as_u16() == 429 {
            if retry {
                warn!("rate limit reached, waiting {RATE_LIMIT_BACKOFF_SECS}s before retrying");
                tokio::time::sleep(Duration::from_secs(RATE_LIMIT_BACKOFF_SECS)).await;
                return Box::pin(self.fetch(query, false)).await;
            }
            exn::bail!(ErrorKind::RateLimited);
        }
        if !status.is_success() {
            exn::bail!(ErrorKind::Api(status.as_u16()));
        }
        response.json::<Value>().await.or_raise(|| ErrorKind::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(Some("9783462033743"), "Der Schwarm", "Frank Schätzing", "isbn:9783462033743")]
    #[case(None, "Der Schwarm", "Frank Schätzing", "intitle:Der Schwarm+inauthor:Frank Schätzing")]
    #[case(None, "Der Schwarm", "", "intitle:Der Schwarm")]
    fn test_query_preference_order(
        #[case] isbn: Option<&str>,
        #[case] title: &str,
        #[case] author: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(build_query(isbn, title, author).as_deref(), Some(expected));
    }

    #[test]
    fn test_no_identifiers_means_no_query() {
        assert_eq!(build_query(None, "", ""), None);
        assert_eq!(build_query(Some(""), "", ""), None);
    }

    #[test]
    fn test_volume_response_shape() {
        let body = json!({
            "totalItems": 1,
            "items": [{
                "volumeInfo": {
                    "title": "Der Schwarm",
                    "authors": ["Frank Schätzing"],
                    "categories": ["Fiction / Thrillers"],
                    "pageCount": 987,
                    "publishedDate": "2004",
                }
            }]
        });
        let response: VolumesResponse = serde_json::from_value(body).unwrap();
        let info = first_volume(response).unwrap();
        assert_eq!(info.title, "Der Schwarm");
        assert_eq!(info.page_count, 987);
        assert_eq!(info.published_date, "2004");
    }

    #[test]
    fn test_empty_response_has_no_volume() {
        let response: VolumesResponse = serde_json::from_value(json!({"totalItems": 0})).unwrap();
        assert_eq!(first_volume(response), None);
    }

    #[tokio::test]
    async fn test_rate_limiter_spaces_requests() {
        let limiter = RateLimiter::new(100);
        let start = Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() < Duration::from_millis(50));
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(90));
    }

    #[tokio::test]
    async fn test_cached_queries_skip_the_network() {
        let dir = tempfile::tempdir().unwrap();
        let cache = QueryCache::open(dir.path()).await.unwrap();
        cache
            .put(
                "isbn:123",
                &json!({"items": [{"volumeInfo": {"title": "Cached Hit"}}]}),
            )
            .await
            .unwrap();

        // No server anywhere: a hit must come from the cache alone.
        let client = GoogleBooksClient::new(cache).unwrap();
        let info = client.lookup(Some("123"), "", "").await.unwrap().unwrap();
        assert_eq!(info.title, "Cached Hit");
    }
}
