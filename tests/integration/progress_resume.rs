//! Progress tracker persistence across tracker instances

use crate::integration::test_utils::manual_clock;
use glossa::curriculum::Topic;
use glossa::error::ProgressError;
use glossa::progress::{ProgressTracker, MAX_RETRIES};
use std::fs;
use tempfile::TempDir;

fn topics() -> Vec<Topic> {
    vec![
        Topic::new("1", "Научный метод", "Метанавык", Some(0)),
        Topic::new("2", "Критическое мышление", "Метанавык", Some(0)),
        Topic::new("10", "Линейная алгебра", "Математика", Some(1)),
    ]
}

fn tracker(dir: &TempDir) -> ProgressTracker {
    ProgressTracker::new(topics(), dir.path().join("progress.json"), manual_clock())
}

/// A fresh tracker picks up exactly where the previous one stopped
#[test]
fn test_resume_continues_after_processed_topics() {
    let dir = TempDir::new().unwrap();
    let mut first = tracker(&dir);
    let topic = first.next().unwrap();
    first.mark_processed(&topic.id).unwrap();

    let mut second = tracker(&dir);
    assert!(second.load_progress().unwrap());
    assert!(second.is_processed("1"));
    assert_eq!(second.next().unwrap().id, "2");

    let stats = second.get_stats();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.processed, 1);
    assert_eq!(stats.remaining, 2);
}

/// Loading reproduces processed ids, failure counts and the pointer exactly
#[test]
fn test_load_reproduces_saved_state() {
    let dir = TempDir::new().unwrap();
    let mut first = tracker(&dir);
    first.mark_processed("1").unwrap();
    first.mark_failed("2", "timeout").unwrap();
    first.mark_failed("2", "timeout").unwrap();
    for _ in 0..MAX_RETRIES {
        first.mark_failed("10", "404 Not Found").unwrap();
    }

    let mut second = tracker(&dir);
    assert!(second.load_progress().unwrap());
    assert_eq!(second.processed(), first.processed());
    assert_eq!(second.failed(), first.failed());
    assert_eq!(second.current_index(), first.current_index());
    assert_eq!(second.current_index(), 2);
    assert_eq!(second.failed_count("2"), 2);
    assert_eq!(second.get_stats(), first.get_stats());
}

/// A single 404 leaves the topic eligible for another attempt
#[test]
fn test_single_failure_is_retried() {
    let dir = TempDir::new().unwrap();
    let mut tracker = tracker(&dir);
    assert_eq!(tracker.next().unwrap().id, "1");
    tracker
        .mark_failed("1", "Search failed: client error 404: Not Found")
        .unwrap();

    assert_eq!(tracker.failed_count("1"), 1);
    assert!(tracker.should_retry("1"));
    assert_eq!(tracker.next().unwrap().id, "1");
    assert_eq!(tracker.get_stats().failed, 0);
}

/// After the retry ceiling a topic is skipped for good, also across restarts
#[test]
fn test_retry_ceiling_survives_reload() {
    let dir = TempDir::new().unwrap();
    let mut first = tracker(&dir);
    for _ in 0..MAX_RETRIES {
        assert_eq!(first.next().unwrap().id, "1");
        first.mark_failed("1", "timeout").unwrap();
    }
    assert!(!first.should_retry("1"));
    assert_eq!(first.next().unwrap().id, "2");

    let mut second = tracker(&dir);
    second.load_progress().unwrap();
    second.rewind();
    assert_eq!(second.next().unwrap().id, "2");
    assert_eq!(second.failed_topics(), vec!["1".to_string()]);
    assert_eq!(second.get_stats().failed, 1);
    assert_eq!(second.get_stats().remaining, 2);
}

/// Success after earlier failures clears the failure record
#[test]
fn test_success_clears_failures() {
    let dir = TempDir::new().unwrap();
    let mut tracker = tracker(&dir);
    tracker.mark_failed("1", "timeout").unwrap();
    tracker.mark_processed("1").unwrap();
    assert_eq!(tracker.failed_count("1"), 0);
    assert!(tracker.failed_topics().is_empty());
}

/// The persisted document uses the camelCase layout
#[test]
fn test_progress_file_layout() {
    let dir = TempDir::new().unwrap();
    let mut tracker = tracker(&dir);
    tracker.mark_processed("1").unwrap();
    tracker.mark_failed("2", "timeout").unwrap();

    let text = fs::read_to_string(dir.path().join("progress.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["currentIndex"], 1);
    assert_eq!(value["processed"], serde_json::json!(["1"]));
    assert_eq!(value["failed"]["2"], 1);
    assert_eq!(value["timestamp"], "2024-01-01T00:00:00+00:00");
    assert_eq!(value["stats"]["total"], 3);
    assert!(!dir.path().join("progress.json.tmp").exists());
}

/// Reset clears persisted state as well as memory
#[test]
fn test_reset_persists_empty_state() {
    let dir = TempDir::new().unwrap();
    let mut first = tracker(&dir);
    first.mark_processed("1").unwrap();
    first.reset().unwrap();

    let mut second = tracker(&dir);
    assert!(second.load_progress().unwrap());
    assert!(second.processed().is_empty());
    assert_eq!(second.next().unwrap().id, "1");
}

/// Garbage in the progress file is reported, not silently discarded
#[test]
fn test_corrupt_progress_is_an_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("progress.json"), "{ not json").unwrap();
    let err = tracker(&dir).load_progress().unwrap_err();
    assert!(matches!(err, ProgressError::CorruptProgress { .. }));
}
