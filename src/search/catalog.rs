//! Offline search backend over a curated resource catalog.

use super::backend::SearchBackend;
use super::{SearchOptions, SearchResult};
use crate::error::{CatalogError, LookupError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("default_catalog.json");

/// One curated resource. Entries without keywords are generic fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    /// Lower-case stems matched as substrings of the query
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Ranks catalog entries by how many of their keywords occur in the query, then
/// pads the answer with generic entries.
#[derive(Debug, Clone)]
pub struct CatalogBackend {
    entries: Vec<CatalogEntry>,
}

impl CatalogBackend {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|mut entry| {
                entry.keywords = entry
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect();
                entry
            })
            .collect();
        Self { entries }
    }

    /// Catalog compiled into the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::parse(BUILTIN_CATALOG, "builtin")
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    fn parse(text: &str, origin: &str) -> Result<Self, CatalogError> {
        let entries: Vec<CatalogEntry> =
            serde_json::from_str(text).map_err(|e| CatalogError::Parse {
                origin: origin.to_string(),
                message: e.to_string(),
            })?;
        if entries.is_empty() {
            return Err(CatalogError::Parse {
                origin: origin.to_string(),
                message: "catalog has no entries".to_string(),
            });
        }
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries answering `query`, best first, at most `limit`
    pub fn rank(&self, query: &str, limit: usize) -> Vec<&CatalogEntry> {
        let query = query.to_lowercase();

        let mut matched: Vec<(usize, &CatalogEntry)> = self
            .entries
            .iter()
            .filter(|entry| !entry.keywords.is_empty())
            .map(|entry| {
                let hits = entry
                    .keywords
                    .iter()
                    .filter(|keyword| query.contains(keyword.as_str()))
                    .count();
                (hits, entry)
            })
            .filter(|(hits, _)| *hits > 0)
            .collect();
        // stable: equal hit counts keep catalog order
        matched.sort_by(|a, b| b.0.cmp(&a.0));

        matched
            .into_iter()
            .map(|(_, entry)| entry)
            .chain(self.entries.iter().filter(|entry| entry.keywords.is_empty()))
            .take(limit)
            .collect()
    }
}

#[async_trait]
impl SearchBackend for CatalogBackend {
    async fn lookup(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, LookupError> {
        Ok(self
            .rank(query, options.num_results)
            .into_iter()
            .map(|entry| SearchResult::new(&entry.url, &entry.title, &entry.snippet))
            .collect())
    }

    fn name(&self) -> &str {
        "catalog"
    }
}
