//! Source finder pacing and retry behavior, driven by a manual clock

use glossa::clock::{ManualClock, SharedClock};
use glossa::config::{RetryConfig, SearchConfig};
use glossa::error::{LookupError, SearchError};
use glossa::search::{FnBackend, SearchOptions, SearchResult, SourceFinder};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn search_config(per_minute: u32, min_interval_ms: u64) -> SearchConfig {
    SearchConfig {
        rate_limit_per_minute: per_minute,
        min_interval_ms,
        retry: RetryConfig {
            initial_delay_ms: 1000,
            multiplier: 2.0,
            max_delay_ms: 30_000,
        },
        ..SearchConfig::default()
    }
}

fn ok_result() -> Vec<SearchResult> {
    vec![SearchResult::new("https://docs.example.org/", "Docs", "")]
}

/// Consecutive calls are spaced and a full window waits for its oldest call to expire
#[tokio::test]
async fn test_rate_limit_spacing_and_window() {
    let clock = Arc::new(ManualClock::at_epoch());
    let shared: SharedClock = clock.clone();
    let backend = FnBackend::new("ok", |_: &str, _: &SearchOptions| Ok(ok_result()));
    let finder = SourceFinder::from_config(Arc::new(backend), &search_config(2, 1000), shared);

    let options = SearchOptions::default();
    for query in ["первый", "второй", "третий"] {
        finder.search(query, &options).await.unwrap();
    }

    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_secs(1), Duration::from_secs(59)]
    );
    assert_eq!(clock.total_slept(), Duration::from_secs(60));
}

/// Retryable failures back off exponentially and then succeed
#[tokio::test]
async fn test_transient_failures_are_retried_with_backoff() {
    let clock = Arc::new(ManualClock::at_epoch());
    let shared: SharedClock = clock.clone();
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let backend = FnBackend::new("flaky", move |_: &str, _: &SearchOptions| {
        if counter.fetch_add(1, Ordering::SeqCst) < 2 {
            Err(LookupError::server(503, "unavailable"))
        } else {
            Ok(ok_result())
        }
    });
    let finder = SourceFinder::from_config(Arc::new(backend), &search_config(60, 0), shared);

    let results = finder
        .search("алгебра документация", &SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
}

/// The attempt ceiling surfaces the last failure
#[tokio::test]
async fn test_retries_stop_at_the_ceiling() {
    let clock = Arc::new(ManualClock::at_epoch());
    let shared: SharedClock = clock.clone();
    let backend = FnBackend::new("down", |_: &str, _: &SearchOptions| {
        Err(LookupError::timeout("deadline exceeded"))
    });
    let finder = SourceFinder::from_config(Arc::new(backend), &search_config(60, 0), shared);

    let err = finder
        .search("алгебра", &SearchOptions::default())
        .await
        .unwrap_err();
    match err {
        SearchError::Exhausted { attempts, last, .. } => {
            assert_eq!(attempts, 3);
            assert_eq!(last, LookupError::timeout("deadline exceeded"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(clock.sleeps().len(), 2);
}

/// Client errors are returned immediately without waiting
#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let clock = Arc::new(ManualClock::at_epoch());
    let shared: SharedClock = clock.clone();
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let backend = FnBackend::new("missing", move |_: &str, _: &SearchOptions| {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(LookupError::client(404, "404 Not Found"))
    });
    let finder = SourceFinder::from_config(Arc::new(backend), &search_config(60, 0), shared);

    let err = finder
        .search("алгебра", &SearchOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Lookup { .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(clock.sleeps().is_empty());
}

/// Results beyond the requested count are dropped
#[tokio::test]
async fn test_results_are_truncated_to_requested_count() {
    let backend = FnBackend::new("many", |_: &str, _: &SearchOptions| {
        Ok((0..8)
            .map(|i| SearchResult::new(format!("https://docs.example.org/{}", i), "Docs", ""))
            .collect())
    });
    let clock: SharedClock = Arc::new(ManualClock::at_epoch());
    let finder = SourceFinder::from_config(Arc::new(backend), &search_config(60, 0), clock);
    let options = SearchOptions {
        num_results: 3,
        ..SearchOptions::default()
    };
    assert_eq!(finder.search("алгебра", &options).await.unwrap().len(), 3);
}
