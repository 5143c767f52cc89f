//! Source finding: query construction, rate-limited and retried lookups, quality
//! ranking and URL deduplication.

pub mod backend;
pub mod catalog;
pub mod quality;
pub mod rate_limit;
pub mod retry;

pub use backend::{FnBackend, HttpSearchBackend, SearchBackend};
pub use catalog::{CatalogBackend, CatalogEntry};
pub use quality::{filter_by_quality, score_result};
pub use rate_limit::RateLimiter;
pub use retry::{is_retryable, RetryPolicy, MAX_ATTEMPTS};

use crate::clock::SharedClock;
use crate::config::{SearchConfig, SearchMode};
use crate::curriculum::Topic;
use crate::error::{LookupError, SearchError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Raw hit returned by a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
}

impl SearchResult {
    pub fn new(url: impl Into<String>, title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            snippet: snippet.into(),
        }
    }
}

/// Scored reference candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub quality_score: i32,
}

impl Source {
    pub fn from_result(result: SearchResult, quality_score: i32) -> Self {
        Self {
            url: result.url,
            title: result.title,
            snippet: result.snippet,
            quality_score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub num_results: usize,
    pub mode: SearchMode,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            num_results: 10,
            mode: SearchMode::Neural,
        }
    }
}

/// Search query variants for a topic, in a fixed order: Russian framings first,
/// then English, then academic. Category-augmented variants appear when the topic
/// has a known category.
pub fn build_queries(topic: &Topic) -> Result<Vec<String>, SearchError> {
    let title = topic.title.trim();
    if title.is_empty() {
        return Err(SearchError::InvalidTopic(topic.id.clone()));
    }
    let category = topic.category_name.trim();
    let has_category = !category.is_empty() && category != crate::curriculum::UNKNOWN_CATEGORY;

    let mut queries = vec![
        format!("{} документация", title),
        format!("{} руководство", title),
        format!("{} учебник", title),
    ];
    if has_category {
        queries.push(format!("{} {} обучение", title, category));
    }
    queries.extend([
        format!("{} documentation", title),
        format!("{} tutorial", title),
        format!("{} guide", title),
        format!("{} official docs", title),
    ]);
    if has_category {
        queries.push(format!("{} {} learning", title, category));
    }
    queries.extend([format!("{} academic", title), format!("{} research", title)]);
    Ok(queries)
}

/// Keep the first occurrence of each URL, compared case-insensitively. Sources
/// without a URL are dropped.
pub fn dedupe_by_url(sources: Vec<Source>) -> Vec<Source> {
    let mut seen = HashSet::new();
    sources
        .into_iter()
        .filter(|source| {
            let key = source.url.trim().to_lowercase();
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}

/// Rate-limited, retrying front end over a [`SearchBackend`]
pub struct SourceFinder {
    backend: Arc<dyn SearchBackend>,
    limiter: RateLimiter,
    retry: RetryPolicy,
    clock: SharedClock,
}

impl SourceFinder {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        limiter: RateLimiter,
        retry: RetryPolicy,
        clock: SharedClock,
    ) -> Self {
        Self {
            backend,
            limiter,
            retry,
            clock,
        }
    }

    pub fn from_config(
        backend: Arc<dyn SearchBackend>,
        config: &SearchConfig,
        clock: SharedClock,
    ) -> Self {
        let limiter = RateLimiter::new(
            config.rate_limit_per_minute,
            Duration::from_millis(config.min_interval_ms),
            clock.clone(),
        );
        Self::new(backend, limiter, RetryPolicy::from_config(&config.retry), clock)
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn build_queries(&self, topic: &Topic) -> Result<Vec<String>, SearchError> {
        build_queries(topic)
    }

    pub fn filter_by_quality(&self, results: Vec<SearchResult>) -> Vec<Source> {
        filter_by_quality(results)
    }

    /// Look up `query`, waiting on the rate limiter before every attempt.
    ///
    /// Retryable failures are retried with backoff up to the attempt ceiling;
    /// the first non-retryable failure is returned as is.
    pub async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::InvalidQuery);
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            self.limiter.acquire().await;

            match self.backend.lookup(query, options).await {
                Ok(mut results) => {
                    results.truncate(options.num_results);
                    debug!(
                        query,
                        attempt,
                        results = results.len(),
                        backend = self.backend.name(),
                        "Search completed"
                    );
                    return Ok(results);
                }
                Err(error) => {
                    if !is_retryable(&error) {
                        debug!(query, attempt, error = %error, "Non-retryable search failure");
                        return Err(SearchError::Lookup {
                            query: query.to_string(),
                            source: error,
                        });
                    }
                    if attempt >= self.retry.max_attempts {
                        return Err(exhausted(query, attempt, error));
                    }
                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        query,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Search failed, retrying"
                    );
                    self.clock.sleep(delay).await;
                }
            }
        }
    }
}

fn exhausted(query: &str, attempts: u32, last: LookupError) -> SearchError {
    SearchError::Exhausted {
        query: query.to_string(),
        attempts,
        last,
    }
}
