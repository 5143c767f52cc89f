//! Resumable iteration over topics with bounded retries.
//!
//! Each topic moves `unseen -> processing -> processed | retry pending |
//! permanently failed`. State is written to disk on every transition, so a crash
//! between topics loses at most the topic in flight.

use crate::clock::SharedClock;
use crate::curriculum::Topic;
use crate::error::ProgressError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Failed attempts after which a topic is no longer retried
pub const MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressStats {
    pub total: usize,
    pub processed: usize,
    /// Permanently failed only; topics mid-retry count as remaining
    pub failed: usize,
    pub remaining: usize,
}

/// On-disk progress document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressFile {
    #[serde(default)]
    current_index: usize,
    #[serde(default)]
    processed: Vec<String>,
    #[serde(default)]
    failed: BTreeMap<String, u32>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    stats: Option<ProgressStats>,
}

pub struct ProgressTracker {
    topics: Vec<Topic>,
    /// `None` keeps all state in memory
    path: Option<PathBuf>,
    clock: SharedClock,
    current_index: usize,
    processed: BTreeSet<String>,
    failed: BTreeMap<String, u32>,
}

impl ProgressTracker {
    pub fn new(topics: Vec<Topic>, path: impl Into<PathBuf>, clock: SharedClock) -> Self {
        Self::build(topics, Some(path.into()), clock)
    }

    /// Tracker that never touches the filesystem
    pub fn ephemeral(topics: Vec<Topic>, clock: SharedClock) -> Self {
        Self::build(topics, None, clock)
    }

    fn build(topics: Vec<Topic>, path: Option<PathBuf>, clock: SharedClock) -> Self {
        Self {
            topics,
            path,
            clock,
            current_index: 0,
            processed: BTreeSet::new(),
            failed: BTreeMap::new(),
        }
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_ephemeral(&self) -> bool {
        self.path.is_none()
    }

    /// Keep the loaded state but stop persisting it.
    pub fn detach(&mut self) {
        self.path = None;
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn processed(&self) -> &BTreeSet<String> {
        &self.processed
    }

    pub fn failed(&self) -> &BTreeMap<String, u32> {
        &self.failed
    }

    pub fn is_processed(&self, id: &str) -> bool {
        self.processed.contains(id)
    }

    /// Next eligible topic. The pointer only moves past topics that are done
    /// for good, so calling again without marking returns the same topic.
    pub fn next(&mut self) -> Option<Topic> {
        while let Some(topic) = self.topics.get(self.current_index) {
            if self.processed.contains(&topic.id) || !self.should_retry(&topic.id) {
                self.current_index += 1;
                continue;
            }
            return Some(topic.clone());
        }
        None
    }

    pub fn mark_processed(&mut self, id: &str) -> Result<(), ProgressError> {
        check_id(id)?;
        self.processed.insert(id.to_string());
        self.failed.remove(id);
        self.current_index += 1;
        debug!(topic_id = id, index = self.current_index, "Topic marked processed");
        self.save_progress()
    }

    pub fn mark_failed(&mut self, id: &str, error: &str) -> Result<(), ProgressError> {
        check_id(id)?;
        let attempts = self.failed.entry(id.to_string()).or_insert(0);
        *attempts += 1;
        let attempts = *attempts;
        if attempts >= MAX_RETRIES {
            self.current_index += 1;
            warn!(topic_id = id, attempts, error, "Topic permanently failed");
        } else {
            debug!(topic_id = id, attempts, error, "Topic failed, will retry");
        }
        self.save_progress()
    }

    pub fn should_retry(&self, id: &str) -> bool {
        self.failed_count(id) < MAX_RETRIES
    }

    pub fn failed_count(&self, id: &str) -> u32 {
        self.failed.get(id).copied().unwrap_or(0)
    }

    /// Counts restricted to the current topic list
    pub fn get_stats(&self) -> ProgressStats {
        let total = self.topics.len();
        let ids: HashSet<&str> = self.topics.iter().map(|t| t.id.as_str()).collect();
        let processed = self
            .processed
            .iter()
            .filter(|id| ids.contains(id.as_str()))
            .count();
        let failed = self
            .failed
            .iter()
            .filter(|(id, &count)| count >= MAX_RETRIES && ids.contains(id.as_str()))
            .count();
        ProgressStats {
            total,
            processed,
            failed,
            remaining: total.saturating_sub(processed + failed),
        }
    }

    /// Permanently failed ids in topic order
    pub fn failed_topics(&self) -> Vec<String> {
        self.topics
            .iter()
            .filter(|topic| !self.should_retry(&topic.id))
            .map(|topic| topic.id.clone())
            .collect()
    }

    /// Forget any recorded outcome for `ids` so they are generated again.
    pub fn requeue<S: AsRef<str>>(&mut self, ids: &[S]) {
        for id in ids {
            let id = id.as_ref();
            let was_processed = self.processed.remove(id);
            let was_failed = self.failed.remove(id).is_some();
            if was_processed || was_failed {
                debug!(topic_id = id, "Topic requeued");
            }
        }
    }

    /// Move the pointer back to the first eligible topic.
    pub fn rewind(&mut self) {
        self.current_index = self
            .topics
            .iter()
            .position(|topic| !self.processed.contains(&topic.id) && self.should_retry(&topic.id))
            .unwrap_or(self.topics.len());
    }

    pub fn save_progress(&self) -> Result<(), ProgressError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let document = ProgressFile {
            current_index: self.current_index,
            processed: self.processed.iter().cloned().collect(),
            failed: self.failed.clone(),
            timestamp: Some(self.clock.now().to_rfc3339()),
            stats: Some(self.get_stats()),
        };
        let json = serde_json::to_string_pretty(&document)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json).map_err(|e| io_error(&temp_path, e))?;
        fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            io_error(path, e)
        })?;
        Ok(())
    }

    /// Restore persisted state; `Ok(false)` when there is nothing to restore.
    pub fn load_progress(&mut self) -> Result<bool, ProgressError> {
        let Some(path) = &self.path else {
            return Ok(false);
        };
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(io_error(path, e)),
        };
        let document: ProgressFile =
            serde_json::from_str(&text).map_err(|e| ProgressError::CorruptProgress {
                path: path.clone(),
                message: e.to_string(),
            })?;

        self.current_index = document.current_index;
        self.processed = document.processed.into_iter().collect();
        self.failed = document.failed;
        info!(
            path = ?path,
            current_index = self.current_index,
            processed = self.processed.len(),
            failed = self.failed.len(),
            "Progress loaded"
        );
        Ok(true)
    }

    /// Clear all state and persist immediately.
    pub fn reset(&mut self) -> Result<(), ProgressError> {
        self.current_index = 0;
        self.processed.clear();
        self.failed.clear();
        info!("Progress reset");
        self.save_progress()
    }
}

fn check_id(id: &str) -> Result<(), ProgressError> {
    if id.trim().is_empty() {
        Err(ProgressError::InvalidTopicId)
    } else {
        Ok(())
    }
}

fn io_error(path: &Path, source: io::Error) -> ProgressError {
    ProgressError::Io {
        path: path.to_path_buf(),
        source,
    }
}
