//! Error types for the content generation pipeline.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Curriculum loading errors
#[derive(Debug, Error)]
pub enum CurriculumError {
    #[error("Failed to parse curriculum {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid curriculum structure: {0}")]
    Structure(String),

    #[error("Curriculum I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Classification of a failed call to the external search collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupErrorKind {
    Timeout,
    Network,
    RateLimited,
    Server(u16),
    Client(u16),
    Other,
}

impl fmt::Display for LookupErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupErrorKind::Timeout => write!(f, "timeout"),
            LookupErrorKind::Network => write!(f, "network error"),
            LookupErrorKind::RateLimited => write!(f, "rate limited"),
            LookupErrorKind::Server(status) => write!(f, "server error {}", status),
            LookupErrorKind::Client(status) => write!(f, "client error {}", status),
            LookupErrorKind::Other => write!(f, "lookup error"),
        }
    }
}

/// Failure surfaced by a search backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct LookupError {
    pub kind: LookupErrorKind,
    pub message: String,
}

impl LookupError {
    pub fn new(kind: LookupErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(LookupErrorKind::Timeout, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LookupErrorKind::Network, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(LookupErrorKind::RateLimited, message)
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::new(LookupErrorKind::Server(status), message)
    }

    pub fn client(status: u16, message: impl Into<String>) -> Self {
        Self::new(LookupErrorKind::Client(status), message)
    }

    /// Unclassified failure; retryability is decided from the message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(LookupErrorKind::Other, message)
    }
}

/// Resource catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog {origin}: {message}")]
    Parse { origin: String, message: String },
}

/// Source finding errors
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Topic must have a title (topic id: {0})")]
    InvalidTopic(String),

    #[error("Query must be a non-empty string")]
    InvalidQuery,

    #[error("Search failed for query {query:?}: {source}")]
    Lookup {
        query: String,
        #[source]
        source: LookupError,
    },

    #[error("Search failed after {attempts} attempts for query {query:?}: {last}")]
    Exhausted {
        query: String,
        attempts: u32,
        #[source]
        last: LookupError,
    },
}

/// Section composition failure
#[derive(Debug, Clone, Error)]
#[error("Failed to compose {section} section: {message}")]
pub struct ComposeError {
    pub section: String,
    pub message: String,
}

/// Root cause of a failed description generation
#[derive(Debug, Error)]
pub enum GenerationCause {
    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("No usable sources found across {queries} queries")]
    NoSources { queries: usize },

    #[error(transparent)]
    Compose(#[from] ComposeError),
}

/// Description generation error, always carrying the topic it was raised for
#[derive(Debug, Error)]
#[error("Failed to generate description for topic {title:?}: {cause}")]
pub struct GenerationError {
    pub title: String,
    #[source]
    pub cause: GenerationCause,
}

impl GenerationError {
    pub fn new(title: impl Into<String>, cause: impl Into<GenerationCause>) -> Self {
        Self {
            title: title.into(),
            cause: cause.into(),
        }
    }

    pub fn is_no_sources(&self) -> bool {
        matches!(self.cause, GenerationCause::NoSources { .. })
    }
}

/// Result file errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Results file {path:?} is corrupt: {message}")]
    CorruptFile { path: PathBuf, message: String },

    #[error("Serialized results failed syntax validation: {0}")]
    InvalidSyntax(String),

    #[error("No backup found at {0:?}")]
    NoBackup(PathBuf),

    #[error("Store I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Progress persistence errors
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("Progress file {path:?} is corrupt: {message}")]
    CorruptProgress { path: PathBuf, message: String },

    #[error("Topic id must be a non-empty string")]
    InvalidTopicId,

    #[error("Failed to serialize progress: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Progress I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration and logging setup errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Configuration file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("Configuration validation failed:\n{0}")]
    Invalid(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// Per-topic failure; routed into the progress tracker instead of aborting the run
#[derive(Debug, Error)]
pub enum TopicError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Failed to persist result: {0}")]
    Store(#[from] StoreError),

    #[error("Content validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Fatal run errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Curriculum(#[from] CurriculumError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Progress(#[from] ProgressError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Failed to initialize components: {0}")]
    Init(String),

    #[error("Failed to write summary {path:?}: {source}")]
    Summary {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
