//! Search backends: the external lookup collaborator behind the source finder.

use super::{SearchOptions, SearchResult};
use crate::config::HttpBackendConfig;
use crate::error::LookupError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// External lookup capability. Implementations classify their failures into a
/// [`LookupError`]; the source finder decides what to do with them.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn lookup(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, LookupError>;

    /// Backend name for logs
    fn name(&self) -> &str;
}

/// Backend driven by a plain closure; handy for wiring a custom lookup without a type.
pub struct FnBackend<F> {
    name: String,
    lookup: F,
}

impl<F> FnBackend<F>
where
    F: Fn(&str, &SearchOptions) -> Result<Vec<SearchResult>, LookupError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, lookup: F) -> Self {
        Self {
            name: name.into(),
            lookup,
        }
    }
}

#[async_trait]
impl<F> SearchBackend for FnBackend<F>
where
    F: Fn(&str, &SearchOptions) -> Result<Vec<SearchResult>, LookupError> + Send + Sync,
{
    async fn lookup(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, LookupError> {
        (self.lookup)(query, options)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    query: &'a str,
    num_results: usize,
    #[serde(rename = "type")]
    mode: &'a str,
}

#[derive(Debug, Deserialize)]
struct WrappedResults {
    results: Vec<SearchResult>,
}

/// Generic JSON-over-HTTP search endpoint.
///
/// Sends `POST {query, numResults, type}` and accepts either a bare array of
/// `{url, title, snippet}` or an object with a `results` array.
pub struct HttpSearchBackend {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpSearchBackend {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LookupError> {
        let client = Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::other(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    /// Build from config; the API key is read from the configured environment variable.
    pub fn from_config(config: &HttpBackendConfig) -> Result<Self, LookupError> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| LookupError::other("http backend requires an endpoint"))?;
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self::new(endpoint, api_key, Duration::from_secs(config.timeout_secs))
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn lookup(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, LookupError> {
        let request = LookupRequest {
            query,
            num_results: options.num_results,
            mode: options.mode.as_str(),
        };

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().await.map_err(map_http_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_status(status, &error_text));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| LookupError::other(format!("Failed to parse response: {}", e)))?;
        let results = parse_results(body)?;
        debug!(query, results = results.len(), "HTTP search completed");
        Ok(results)
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn map_http_error(error: reqwest::Error) -> LookupError {
    if let Some(status) = error.status() {
        map_status(status.as_u16(), &error.to_string())
    } else if error.is_timeout() {
        LookupError::timeout(format!("Request timeout: {}", error))
    } else if error.is_connect() || error.is_request() {
        LookupError::network(format!("Connection error: {}", error))
    } else {
        LookupError::other(format!("HTTP error: {}", error))
    }
}

fn map_status(status: u16, text: &str) -> LookupError {
    match status {
        429 => LookupError::rate_limited(format!("Rate limit exceeded: {}", text)),
        500..=599 => LookupError::server(status, format!("Request failed: {}", text)),
        _ => LookupError::client(status, format!("Request failed: {}", text)),
    }
}

fn parse_results(body: Value) -> Result<Vec<SearchResult>, LookupError> {
    let parsed = if body.is_array() {
        serde_json::from_value::<Vec<SearchResult>>(body)
    } else {
        serde_json::from_value::<WrappedResults>(body).map(|wrapped| wrapped.results)
    };
    parsed.map_err(|e| LookupError::other(format!("Unexpected response shape: {}", e)))
}
