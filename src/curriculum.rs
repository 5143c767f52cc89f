//! Curriculum source: reads the category → topics definition and flattens it.
//!
//! Two layouts are accepted. A plain JSON array of categories, or an ES module of the
//! form `export const curriculum = [...];` whose array literal is sliced out and handed
//! to `serde_json`. The module is never evaluated.

use crate::error::CurriculumError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const UNKNOWN_CATEGORY: &str = "Unknown Category";

static MODULE_EXPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)export\s+const\s+curriculum\s*=\s*(\[.*\])\s*;?\s*$")
        .expect("curriculum export pattern is valid")
});

/// One educational unit, flattened out of its category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub category_name: String,
    pub category_id: Option<i64>,
}

impl Topic {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        category_name: impl Into<String>,
        category_id: Option<i64>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category_name: category_name.into(),
            category_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Integer(n) => n.to_string(),
            RawId::Float(f) if f.fract() == 0.0 => format!("{}", f as i64),
            RawId::Float(f) => f.to_string(),
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            RawId::Text(s) => s.trim().parse().ok(),
            RawId::Integer(n) => Some(*n),
            RawId::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            RawId::Float(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    topics: Option<Vec<RawTopic>>,
}

#[derive(Debug, Deserialize)]
struct RawTopic {
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default)]
    title: Option<String>,
}

/// Read-only view over the curriculum file
#[derive(Debug, Clone)]
pub struct CurriculumSource {
    path: PathBuf,
}

impl CurriculumSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every topic of every category, in file order
    pub fn read_all(&self) -> Result<Vec<Topic>, CurriculumError> {
        let text = self.read_text()?;
        let topics = parse_curriculum(&text, &self.path)?;
        debug!(
            path = %self.path.display(),
            topics = topics.len(),
            "Curriculum loaded"
        );
        Ok(topics)
    }

    /// BLAKE3 hex digest of the raw file, used to detect edits made during a run
    pub fn content_hash(&self) -> Result<String, CurriculumError> {
        let bytes = std::fs::read(&self.path).map_err(|e| self.map_io(e))?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }

    fn read_text(&self) -> Result<String, CurriculumError> {
        std::fs::read_to_string(&self.path).map_err(|e| self.map_io(e))
    }

    fn map_io(&self, e: std::io::Error) -> CurriculumError {
        if e.kind() == std::io::ErrorKind::NotFound {
            CurriculumError::Parse {
                path: self.path.clone(),
                message: "curriculum file not found".to_string(),
            }
        } else {
            CurriculumError::Io {
                path: self.path.clone(),
                source: e,
            }
        }
    }
}

/// Parse curriculum text in either supported layout
pub fn parse_curriculum(text: &str, path: &Path) -> Result<Vec<Topic>, CurriculumError> {
    let parse_err = |message: String| CurriculumError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let trimmed = text.trim_start_matches('\u{feff}').trim();
    let array_text = if trimmed.starts_with('[') {
        trimmed
    } else {
        MODULE_EXPORT
            .captures(trimmed)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| parse_err("could not find curriculum array".to_string()))?
    };

    let value: Value = serde_json::from_str(array_text).map_err(|e| parse_err(e.to_string()))?;
    let Value::Array(categories) = value else {
        return Err(parse_err("curriculum is not an array".to_string()));
    };

    let mut topics = Vec::new();
    for (index, category) in categories.into_iter().enumerate() {
        if !category.is_object() {
            return Err(CurriculumError::Structure(format!(
                "category at index {} is not an object",
                index
            )));
        }
        let raw: RawCategory = serde_json::from_value(category).map_err(|e| {
            CurriculumError::Structure(format!("category at index {}: {}", index, e))
        })?;
        topics.extend(extract_topics(raw)?);
    }

    warn_on_duplicates(&topics);
    Ok(topics)
}

fn extract_topics(category: RawCategory) -> Result<Vec<Topic>, CurriculumError> {
    let category_name = category
        .category
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
    let category_id = category.id.as_ref().and_then(RawId::as_integer);

    let Some(raw_topics) = category.topics else {
        return Err(CurriculumError::Structure(format!(
            "category {:?} has no topics array",
            category_name
        )));
    };

    raw_topics
        .into_iter()
        .enumerate()
        .map(|(index, topic)| {
            let id = topic.id.map(RawId::into_string).ok_or_else(|| {
                CurriculumError::Structure(format!(
                    "topic {} in category {:?} has no id",
                    index, category_name
                ))
            })?;
            Ok(Topic {
                id,
                title: topic.title.unwrap_or_default(),
                category_name: category_name.clone(),
                category_id,
            })
        })
        .collect()
}

fn warn_on_duplicates(topics: &[Topic]) {
    let mut seen = HashSet::new();
    for topic in topics {
        if !seen.insert(topic.id.as_str()) {
            warn!(topic_id = %topic.id, title = %topic.title, "Duplicate topic id in curriculum");
        }
    }
}
