//! End-to-end runs of the orchestrator against temporary files

use crate::integration::test_utils::{read_json, Workspace, CURRICULUM_JSON, TOPIC_IDS};
use glossa::error::{LookupError, PipelineError, StoreError};
use glossa::generation::LegacyComposer;
use glossa::pipeline::{ProgressUpdate, RunOptions};
use glossa::search::{CatalogBackend, FnBackend, SearchBackend, SearchOptions, SearchResult};
use glossa::store::ResultStore;
use parking_lot::Mutex;
use std::fs;
use std::sync::Arc;

/// Backend that answers every query except those mentioning `missing`
fn backend_missing(missing: &'static str) -> Arc<dyn SearchBackend> {
    let catalog = CatalogBackend::builtin().unwrap();
    let entries: Vec<SearchResult> = catalog
        .rank("", 10)
        .into_iter()
        .map(|entry| SearchResult::new(&entry.url, &entry.title, &entry.snippet))
        .collect();
    Arc::new(FnBackend::new("partial", move |query: &str, _: &SearchOptions| {
        if query.contains(missing) {
            Err(LookupError::client(404, "404 Not Found"))
        } else {
            Ok(entries.clone())
        }
    }))
}

/// A full run writes one entry per topic and a matching summary
#[tokio::test]
async fn test_full_run_processes_every_topic() {
    let ws = Workspace::new();
    let summary = ws.orchestrator(RunOptions::default()).run().await.unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.successful, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.skipped, 0);
    assert!(summary.failed_topics.is_empty());
    assert!(!summary.curriculum_changed);

    let verification = summary.verification.as_ref().unwrap();
    assert!(verification.valid);
    assert!(verification.syntax_valid);
    assert!(verification.missing_topics.is_empty());
    assert_eq!(verification.total_in_file, 3);

    let stored = ResultStore::new(ws.descriptions_path()).read_all().unwrap();
    for id in TOPIC_IDS {
        assert!(stored.contains_key(id), "missing entry {}", id);
    }
    assert_eq!(stored["10"].title, "Линейная алгебра");

    let text = fs::read_to_string(ws.descriptions_path()).unwrap();
    assert!(text.starts_with("// Расширенные научные описания для каждого модуля\n"));
    let first = text.find("\"1\":").unwrap();
    let second = text.find("\"2\":").unwrap();
    let tenth = text.find("\"10\":").unwrap();
    assert!(first < second && second < tenth);

    let written = read_json(&ws.summary_path());
    assert_eq!(written["successful"], 3);
    assert_eq!(written["failed"], 0);
    assert_eq!(written["dryRun"], false);

    let progress = read_json(&ws.progress_path());
    assert_eq!(progress["processed"].as_array().unwrap().len(), 3);
    assert_eq!(progress["stats"]["remaining"], 0);
}

/// A topic whose lookups always 404 is retried, then reported as failed
#[tokio::test]
async fn test_failing_topic_is_reported_and_others_succeed() {
    let ws = Workspace::new();
    let summary = ws
        .orchestrator(RunOptions::default())
        .with_backend(backend_missing("Критическое"))
        .run()
        .await
        .unwrap();

    assert_eq!(summary.successful, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failed_topics, vec!["2".to_string()]);

    let progress = read_json(&ws.progress_path());
    assert_eq!(progress["failed"]["2"], 3);

    let stored = ResultStore::new(ws.descriptions_path()).read_all().unwrap();
    assert!(stored.contains_key("1"));
    assert!(!stored.contains_key("2"));
    assert!(stored.contains_key("10"));
    assert!(summary.verification.unwrap().valid);
}

/// Dry runs generate and validate but leave results and progress untouched
#[tokio::test]
async fn test_dry_run_writes_nothing_but_the_summary() {
    let ws = Workspace::new();
    let options = RunOptions {
        dry_run: true,
        ..RunOptions::default()
    };
    let summary = ws.orchestrator(options).run().await.unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.successful, 3);
    assert!(summary.verification.is_none());
    assert!(!ws.descriptions_path().exists());
    assert!(!ws.progress_path().exists());
    assert_eq!(read_json(&ws.summary_path())["dryRun"], true);
}

/// A fresh dry run previews every topic and leaves saved progress as it was
#[tokio::test]
async fn test_dry_run_without_resume_keeps_saved_progress() {
    let ws = Workspace::new();
    ws.orchestrator(RunOptions {
        topics: Some(vec!["1".to_string()]),
        ..RunOptions::default()
    })
    .run()
    .await
    .unwrap();
    let saved = fs::read_to_string(ws.progress_path()).unwrap();

    let summary = ws
        .orchestrator(RunOptions {
            resume: false,
            dry_run: true,
            topics: None,
        })
        .run()
        .await
        .unwrap();

    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.successful, 3);
    assert_eq!(fs::read_to_string(ws.progress_path()).unwrap(), saved);
}

/// Only the requested topics are generated; unknown ids are ignored
#[tokio::test]
async fn test_topic_filter_limits_the_run() {
    let ws = Workspace::new();
    let options = RunOptions {
        topics: Some(vec!["10".to_string(), "999".to_string()]),
        ..RunOptions::default()
    };
    let summary = ws.orchestrator(options).run().await.unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.successful, 1);
    let stored = ResultStore::new(ws.descriptions_path()).read_all().unwrap();
    assert_eq!(stored.keys().collect::<Vec<_>>(), vec!["10"]);
}

/// Requested topics are regenerated even when already processed
#[tokio::test]
async fn test_topic_filter_regenerates_processed_topics() {
    let ws = Workspace::new();
    ws.orchestrator(RunOptions::default()).run().await.unwrap();

    let options = RunOptions {
        topics: Some(vec!["2".to_string()]),
        ..RunOptions::default()
    };
    let summary = ws.orchestrator(options).run().await.unwrap();
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.successful, 1);
}

/// A second run resumes and skips what the first one finished
#[tokio::test]
async fn test_resume_skips_processed_topics() {
    let ws = Workspace::new();
    ws.orchestrator(RunOptions {
        topics: Some(vec!["1".to_string()]),
        ..RunOptions::default()
    })
    .run()
    .await
    .unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let summary = ws
        .orchestrator(RunOptions::default())
        .with_progress_observer(Arc::new(move |update: &ProgressUpdate| {
            recorder.lock().push(update.topic_id.clone())
        }))
        .run()
        .await
        .unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.successful, 2);
    assert_eq!(summary.processed, 3);
    assert_eq!(*seen.lock(), vec!["2".to_string(), "10".to_string()]);
}

/// Without resume, previous progress is discarded and everything runs again
#[tokio::test]
async fn test_no_resume_starts_fresh() {
    let ws = Workspace::new();
    ws.orchestrator(RunOptions::default()).run().await.unwrap();

    let summary = ws
        .orchestrator(RunOptions {
            resume: false,
            ..RunOptions::default()
        })
        .run()
        .await
        .unwrap();
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.successful, 3);
}

/// Progress updates count up and carry the topic being processed
#[tokio::test]
async fn test_progress_observer_sees_every_topic() {
    let ws = Workspace::new();
    let updates = Arc::new(Mutex::new(Vec::new()));
    let recorder = updates.clone();
    ws.orchestrator(RunOptions::default())
        .with_progress_observer(Arc::new(move |update: &ProgressUpdate| {
            recorder.lock().push(update.clone())
        }))
        .run()
        .await
        .unwrap();

    let updates = updates.lock();
    assert_eq!(updates.len(), 3);
    assert_eq!(updates[0].processed, 0);
    assert_eq!(updates[0].remaining, 3);
    assert_eq!(updates[2].processed, 2);
    assert_eq!(updates[2].title, "Линейная алгебра");
    assert_eq!(updates[2].eta(), "calculating...");
}

/// In strict mode content that fails validation is treated as a topic failure
#[tokio::test]
async fn test_strict_validation_fails_short_content() {
    let mut ws = Workspace::new();
    ws.config.validation.strict = true;
    let summary = ws
        .orchestrator(RunOptions::default())
        .with_composer(Arc::new(LegacyComposer::new(0)))
        .run()
        .await
        .unwrap();

    assert_eq!(summary.successful, 0);
    assert_eq!(summary.failed, 3);
    assert_eq!(summary.validation_issues.len(), 3);
    assert!(summary.validation_issues["1"]
        .iter()
        .any(|e| e.starts_with("Content too short")));
    assert!(ResultStore::new(ws.descriptions_path())
        .read_all()
        .unwrap()
        .is_empty());
}

/// Outside strict mode failing content is still written and listed for review
#[tokio::test]
async fn test_lenient_validation_keeps_content() {
    let ws = Workspace::new();
    let summary = ws
        .orchestrator(RunOptions::default())
        .with_composer(Arc::new(LegacyComposer::new(0)))
        .run()
        .await
        .unwrap();

    assert_eq!(summary.successful, 3);
    assert_eq!(summary.validation_issues.len(), 3);
    assert_eq!(
        ResultStore::new(ws.descriptions_path()).read_all().unwrap().len(),
        3
    );
}

/// Restoring puts the previous results file back
#[tokio::test]
async fn test_restore_backup_rolls_back_last_write() {
    let ws = Workspace::new();
    ws.orchestrator(RunOptions {
        topics: Some(vec!["1".to_string()]),
        ..RunOptions::default()
    })
    .run()
    .await
    .unwrap();
    let after_first = fs::read_to_string(ws.descriptions_path()).unwrap();

    ws.orchestrator(RunOptions {
        topics: Some(vec!["2".to_string()]),
        ..RunOptions::default()
    })
    .run()
    .await
    .unwrap();
    assert_ne!(fs::read_to_string(ws.descriptions_path()).unwrap(), after_first);

    ws.orchestrator(RunOptions::default()).restore_backup().unwrap();
    assert_eq!(fs::read_to_string(ws.descriptions_path()).unwrap(), after_first);
}

/// Restoring without a backup is an error
#[test]
fn test_restore_without_backup_fails() {
    let ws = Workspace::new();
    let err = ws
        .orchestrator(RunOptions::default())
        .restore_backup()
        .unwrap_err();
    assert!(matches!(err, PipelineError::Store(StoreError::NoBackup(_))));
}

/// Curriculum modules in `export const curriculum = [...]` form are accepted
#[tokio::test]
async fn test_module_curriculum_is_accepted() {
    let module = format!("export const curriculum = {};\n", CURRICULUM_JSON);
    let ws = Workspace::with_curriculum("curriculum.js", &module);
    let summary = ws.orchestrator(RunOptions::default()).run().await.unwrap();
    assert_eq!(summary.successful, 3);
}

/// A missing curriculum aborts the run before anything is written
#[tokio::test]
async fn test_missing_curriculum_is_fatal() {
    let ws = Workspace::new();
    fs::remove_file(&ws.config.paths.curriculum).unwrap();
    let err = ws.orchestrator(RunOptions::default()).run().await.unwrap_err();
    assert!(matches!(err, PipelineError::Curriculum(_)));
    assert!(!ws.summary_path().exists());
}

/// Invalid configuration is rejected before any component is built
#[tokio::test]
async fn test_invalid_config_is_fatal() {
    let mut ws = Workspace::new();
    ws.config.limits.min_words = 5000;
    let err = ws.orchestrator(RunOptions::default()).run().await.unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
}
