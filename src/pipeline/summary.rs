//! Run reporting: per-topic progress updates, output verification and the
//! summary document written at the end of a run.

use crate::error::PipelineError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Samples needed before an ETA is reported
pub const ETA_MIN_SAMPLES: usize = 5;

/// `1h 5m`, `2m 3s` or `42s`
pub fn format_duration(ms: u64) -> String {
    let seconds = ms / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}

/// Per-topic wall times collected during a run
#[derive(Debug, Clone, Default)]
pub struct Timings {
    samples: Vec<u64>,
}

impl Timings {
    pub fn record(&mut self, ms: u64) {
        self.samples.push(ms);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn average_ms(&self) -> u64 {
        if self.samples.is_empty() {
            0
        } else {
            self.samples.iter().sum::<u64>() / self.samples.len() as u64
        }
    }

    /// Estimated time left for `remaining` topics, once enough samples exist
    pub fn eta_ms(&self, remaining: usize) -> Option<u64> {
        (self.samples.len() >= ETA_MIN_SAMPLES).then(|| self.average_ms() * remaining as u64)
    }
}

/// Snapshot emitted before each topic is processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub topic_id: String,
    pub title: String,
    pub total: usize,
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub remaining: usize,
    pub eta_ms: Option<u64>,
}

impl ProgressUpdate {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.processed as f64 * 100.0 / self.total as f64
        }
    }

    pub fn eta(&self) -> String {
        self.eta_ms
            .map(format_duration)
            .unwrap_or_else(|| "calculating...".to_string())
    }
}

/// Cross-check of the results file against the tracker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub valid: bool,
    pub syntax_valid: bool,
    pub missing_topics: Vec<String>,
    pub total_processed: usize,
    pub total_in_file: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: usize,
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration: String,
    pub average_time_per_topic: String,
    pub failed_topics: Vec<String>,
    pub dry_run: bool,
    pub curriculum_changed: bool,
    pub validation_issues: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationReport>,
}

impl RunSummary {
    pub fn write(&self, path: &Path) -> Result<(), PipelineError> {
        let summary_error = |source| PipelineError::Summary {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(summary_error)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| summary_error(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        fs::write(path, json).map_err(summary_error)
    }
}
