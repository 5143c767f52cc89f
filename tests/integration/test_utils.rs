//! Shared fixtures for integration tests
//!
//! Every fixture lives in its own temporary directory so tests can run in parallel.

use glossa::clock::{ManualClock, SharedClock};
use glossa::config::GeneratorConfig;
use glossa::pipeline::{Orchestrator, RunOptions};
use glossa::search::CatalogBackend;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const CURRICULUM_JSON: &str = r#"[
  {
    "id": 0,
    "category": "Метанавык",
    "topics": [
      {"id": "1", "title": "Научный метод"},
      {"id": "2", "title": "Критическое мышление"}
    ]
  },
  {
    "id": 1,
    "category": "Математика",
    "topics": [
      {"id": "10", "title": "Линейная алгебра"}
    ]
  }
]"#;

pub const TOPIC_IDS: [&str; 3] = ["1", "2", "10"];

/// Temporary working directory with a curriculum and a config pointing into it
pub struct Workspace {
    pub dir: TempDir,
    pub config: GeneratorConfig,
}

impl Workspace {
    pub fn new() -> Self {
        Self::with_curriculum("curriculum.json", CURRICULUM_JSON)
    }

    pub fn with_curriculum(file_name: &str, contents: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let curriculum = dir.path().join(file_name);
        fs::write(&curriculum, contents).unwrap();

        let mut config = GeneratorConfig::default();
        config.paths.curriculum = curriculum;
        config.paths.descriptions = dir.path().join("data").join("topicDescriptions.js");
        config.paths.progress = dir.path().join("state").join("progress.json");
        config.search.min_interval_ms = 0;
        Self { dir, config }
    }

    pub fn descriptions_path(&self) -> PathBuf {
        self.config.paths.descriptions.clone()
    }

    pub fn progress_path(&self) -> PathBuf {
        self.config.paths.progress.clone()
    }

    pub fn summary_path(&self) -> PathBuf {
        self.config.paths.summary_path()
    }

    /// Orchestrator over the built-in catalog and a manual clock
    pub fn orchestrator(&self, options: RunOptions) -> Orchestrator {
        Orchestrator::new(self.config.clone(), options)
            .with_clock(manual_clock())
            .with_backend(Arc::new(CatalogBackend::builtin().unwrap()))
    }
}

pub fn manual_clock() -> SharedClock {
    Arc::new(ManualClock::at_epoch())
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let text = fs::read_to_string(path).unwrap();
    serde_json::from_str(&text).unwrap()
}
