//! Configuration System
//!
//! Layered generator configuration: built-in defaults, then a TOML or JSON file,
//! then `GLOSSA__SECTION__KEY` environment overrides. Every field has a default so
//! an empty file (or no file at all) yields a runnable configuration.

use crate::logging::{check_logging_config, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod loader;
mod merge;
mod sources;

pub use loader::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// File locations used by a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_curriculum_path")]
    pub curriculum: PathBuf,

    #[serde(default = "default_descriptions_path")]
    pub descriptions: PathBuf,

    #[serde(default = "default_progress_path")]
    pub progress: PathBuf,

    /// Defaults to `summary.json` next to the progress file
    #[serde(default)]
    pub summary: Option<PathBuf>,

    /// Resource catalog for the offline search backend; built-in catalog when unset
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

fn default_curriculum_path() -> PathBuf {
    PathBuf::from("web/src/data/curriculum.json")
}

fn default_descriptions_path() -> PathBuf {
    PathBuf::from("web/src/data/topicDescriptions.js")
}

fn default_progress_path() -> PathBuf {
    PathBuf::from("generator/progress.json")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            curriculum: default_curriculum_path(),
            descriptions: default_descriptions_path(),
            progress: default_progress_path(),
            summary: None,
            catalog: None,
        }
    }
}

impl PathsConfig {
    pub fn summary_path(&self) -> PathBuf {
        match &self.summary {
            Some(path) => path.clone(),
            None => self
                .progress
                .parent()
                .map(|dir| dir.join("summary.json"))
                .unwrap_or_else(|| PathBuf::from("summary.json")),
        }
    }

    fn resolve_against(&mut self, base: &Path) {
        resolve(&mut self.curriculum, base);
        resolve(&mut self.descriptions, base);
        resolve(&mut self.progress, base);
        if let Some(summary) = self.summary.as_mut() {
            resolve(summary, base);
        }
        if let Some(catalog) = self.catalog.as_mut() {
            resolve(catalog, base);
        }
    }
}

fn resolve(path: &mut PathBuf, base: &Path) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}

/// Content bounds shared by the generator and the validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_min_words")]
    pub min_words: usize,

    #[serde(default = "default_max_words")]
    pub max_words: usize,

    #[serde(default = "default_min_links")]
    pub min_links: usize,

    #[serde(default = "default_max_links")]
    pub max_links: usize,

    #[serde(default = "default_min_cyrillic_ratio")]
    pub min_cyrillic_ratio: f64,
}

fn default_min_words() -> usize {
    500
}

fn default_max_words() -> usize {
    2000
}

fn default_min_links() -> usize {
    5
}

fn default_max_links() -> usize {
    10
}

fn default_min_cyrillic_ratio() -> f64 {
    0.70
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_words: default_min_words(),
            max_words: default_max_words(),
            min_links: default_min_links(),
            max_links: default_max_links(),
            min_cyrillic_ratio: default_min_cyrillic_ratio(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackendKind {
    Catalog,
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Neural,
    Keyword,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Neural => "neural",
            SearchMode::Keyword => "keyword",
        }
    }
}

/// Source lookup settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_backend")]
    pub backend: SearchBackendKind,

    /// Maximum outbound lookups per rolling 60 second window
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,

    /// Minimum spacing between two consecutive lookups
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    #[serde(default = "default_queries_per_topic")]
    pub queries_per_topic: usize,

    #[serde(default = "default_results_per_query")]
    pub results_per_query: usize,

    #[serde(default = "default_mode")]
    pub mode: SearchMode,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub http: HttpBackendConfig,
}

fn default_backend() -> SearchBackendKind {
    SearchBackendKind::Catalog
}

fn default_rate_limit() -> u32 {
    10
}

fn default_min_interval_ms() -> u64 {
    100
}

fn default_queries_per_topic() -> usize {
    3
}

fn default_results_per_query() -> usize {
    5
}

fn default_mode() -> SearchMode {
    SearchMode::Neural
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            rate_limit_per_minute: default_rate_limit(),
            min_interval_ms: default_min_interval_ms(),
            queries_per_topic: default_queries_per_topic(),
            results_per_query: default_results_per_query(),
            mode: default_mode(),
            retry: RetryConfig::default(),
            http: HttpBackendConfig::default(),
        }
    }
}

/// Exponential backoff between lookup attempts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_max_delay_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            multiplier: default_multiplier(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// JSON-over-HTTP search endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpBackendConfig {
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_key_env() -> String {
    "GLOSSA_SEARCH_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComposerKind {
    Template,
    /// Short phrase-table sections, roughly 170 words per description. Always
    /// below the default `min_words` of 500, so under `validation.strict` every
    /// topic fails; meant for quick previews with lenient validation.
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_composer")]
    pub composer: ComposerKind,

    /// Phrase selection seed for the legacy composer
    #[serde(default)]
    pub seed: u64,
}

fn default_composer() -> ComposerKind {
    ComposerKind::Template
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            composer: default_composer(),
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Treat validation failures as per-topic failures instead of warnings
    #[serde(default)]
    pub strict: bool,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Paths(String),
    Limits(String),
    Search(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Paths(msg) => write!(f, "paths: {}", msg),
            ValidationError::Limits(msg) => write!(f, "limits: {}", msg),
            ValidationError::Search(msg) => write!(f, "search: {}", msg),
            ValidationError::Logging(msg) => write!(f, "logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl GeneratorConfig {
    /// Validate the entire configuration, collecting every problem
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let paths = [
            ("curriculum", &self.paths.curriculum),
            ("descriptions", &self.paths.descriptions),
            ("progress", &self.paths.progress),
        ];
        for (name, path) in paths {
            if path.as_os_str().is_empty() {
                errors.push(ValidationError::Paths(format!("{} path cannot be empty", name)));
            }
        }

        let limits = &self.limits;
        if limits.min_words > limits.max_words {
            errors.push(ValidationError::Limits(format!(
                "min_words ({}) exceeds max_words ({})",
                limits.min_words, limits.max_words
            )));
        }
        if limits.min_links > limits.max_links {
            errors.push(ValidationError::Limits(format!(
                "min_links ({}) exceeds max_links ({})",
                limits.min_links, limits.max_links
            )));
        }
        if limits.max_links == 0 {
            errors.push(ValidationError::Limits("max_links must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&limits.min_cyrillic_ratio) {
            errors.push(ValidationError::Limits(format!(
                "min_cyrillic_ratio must be within [0, 1], got {}",
                limits.min_cyrillic_ratio
            )));
        }

        let search = &self.search;
        if search.rate_limit_per_minute == 0 {
            errors.push(ValidationError::Search(
                "rate_limit_per_minute must be at least 1".to_string(),
            ));
        }
        if search.queries_per_topic == 0 {
            errors.push(ValidationError::Search(
                "queries_per_topic must be at least 1".to_string(),
            ));
        }
        if search.results_per_query == 0 {
            errors.push(ValidationError::Search(
                "results_per_query must be at least 1".to_string(),
            ));
        }
        if search.retry.multiplier < 1.0 {
            errors.push(ValidationError::Search(format!(
                "retry.multiplier must be >= 1.0, got {}",
                search.retry.multiplier
            )));
        }
        if search.retry.initial_delay_ms > search.retry.max_delay_ms {
            errors.push(ValidationError::Search(
                "retry.initial_delay_ms exceeds retry.max_delay_ms".to_string(),
            ));
        }
        if search.backend == SearchBackendKind::Http {
            match search.http.endpoint.as_deref() {
                Some(endpoint)
                    if endpoint.starts_with("http://") || endpoint.starts_with("https://") => {}
                Some(endpoint) => errors.push(ValidationError::Search(format!(
                    "http.endpoint must be an http(s) URL, got {:?}",
                    endpoint
                ))),
                None => errors.push(ValidationError::Search(
                    "http backend requires http.endpoint".to_string(),
                )),
            }
        }

        if let Err(e) = check_logging_config(&self.logging) {
            errors.push(ValidationError::Logging(e.to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Make every relative path absolute against `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        self.paths.resolve_against(base);
        resolve(&mut self.logging.file, base);
    }
}
