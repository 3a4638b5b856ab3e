//! Search provider adapters behind one call shape.
//!
//! This crate provides:
//! - [`providers`]: the [`SearchProvider`] trait and five HTTP back ends
//! - [`ProviderRegistry`]: name-based provider lookup
//! - [`SearchClient`]: the boundary the rest of Scout calls, including mock mode
//!   and the error-string policy

pub mod providers;

use std::fmt;
use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use scout_shared::{Result, ScoutError, SearchMode, SearchTopic, Settings};

pub use providers::{
    BraveProvider, ExaProvider, PerplexityProvider, ProviderRegistry, SearchProvider,
    SerperProvider, TavilyProvider,
};

/// User-Agent string for provider requests.
const USER_AGENT: &str = concat!("Scout/", env!("CARGO_PKG_VERSION"));

/// Canned response returned in mock mode. No provider is contacted.
pub const MOCK_RESULT: &str = "- **[MOCK] Zoom expands compliance export API** \
(https://example.com/mock/zoom): Mock data for development; no search provider was called.\n\
- **[MOCK] SEC announces off-channel communications sweep** \
(https://example.com/mock/sec): Mock data for development; no search provider was called.";

// ---------------------------------------------------------------------------
// Request / output types
// ---------------------------------------------------------------------------

/// One search call: `query, topic, days, max_results, mode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub topic: SearchTopic,
    pub days: u32,
    pub max_results: u32,
    pub mode: SearchMode,
}

impl SearchRequest {
    /// A deep news search over the last 7 days returning 5 results.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            topic: SearchTopic::News,
            days: 7,
            max_results: 5,
            mode: SearchMode::Deep,
        }
    }

    pub fn topic(mut self, topic: SearchTopic) -> Self {
        self.topic = topic;
        self
    }

    pub fn days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }

    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Result count after the fast-mode reduction.
    pub fn effective_max_results(&self) -> u32 {
        self.mode.scale_results(self.max_results)
    }

    fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(ScoutError::validation("search query must not be empty"));
        }
        if self.days == 0 {
            return Err(ScoutError::validation("days must be greater than zero"));
        }
        if self.max_results == 0 {
            return Err(ScoutError::validation("max_results must be greater than zero"));
        }
        Ok(())
    }
}

/// A single normalized search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

/// Structured result set returned by the default provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredResults {
    #[serde(default)]
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
}

/// What a provider call yields: a markdown-bulleted string or a structured result.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutput {
    Text(String),
    Structured(StructuredResults),
}

impl SearchOutput {
    /// Whether this output is an inline error produced at the provider boundary.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Text(text) if text.starts_with("Error:"))
    }
}

impl fmt::Display for SearchOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Structured(results) => {
                let json = serde_json::to_string(results).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

/// Render hits as `- **title** (url): snippet` lines.
pub fn bullet_list(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No results found.".to_string();
    }

    hits.iter()
        .map(|hit| {
            let title = if hit.title.trim().is_empty() {
                "Untitled"
            } else {
                hit.title.trim()
            };
            let snippet = collapse_whitespace(&hit.content);
            match &hit.published_date {
                Some(date) if !date.is_empty() => {
                    format!("- **{title}** ({}): {snippet} ({date})", hit.url)
                }
                _ => format!("- **{title}** ({}): {snippet}", hit.url),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// SearchClient
// ---------------------------------------------------------------------------

/// Entry point for every search in Scout.
pub struct SearchClient {
    http: Client,
    registry: ProviderRegistry,
    default_provider: String,
}

impl SearchClient {
    /// Build a client with all built-in providers configured from `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let search = &settings.config.search;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(search.timeout_secs))
            .build()
            .map_err(|e| ScoutError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            registry: ProviderRegistry::from_settings(settings),
            default_provider: search.default_provider.clone(),
        })
    }

    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    /// Names of all registered providers.
    pub fn provider_names(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Run one search and return typed failures.
    ///
    /// An empty provider name selects the default provider. With `mock` set the
    /// canned [`MOCK_RESULT`] is returned before any lookup or network activity.
    #[instrument(skip_all, fields(provider = %provider, query = %request.query, mock = mock))]
    pub async fn try_search(
        &self,
        provider: &str,
        request: &SearchRequest,
        mock: bool,
    ) -> Result<SearchOutput> {
        if mock {
            debug!("mock mode, skipping provider call");
            return Ok(SearchOutput::Text(MOCK_RESULT.to_string()));
        }

        request.validate()?;

        let name = if provider.trim().is_empty() {
            self.default_provider.as_str()
        } else {
            provider.trim()
        };

        let backend = self.registry.get(name).ok_or_else(|| {
            ScoutError::validation(format!("Unknown search provider '{name}'"))
        })?;

        let start = Instant::now();
        let output = backend.search(&self.http, request).await?;

        debug!(
            provider = backend.name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "search complete"
        );

        Ok(output)
    }

    /// Run one search; any failure becomes a `SearchOutput::Text` starting with `"Error: "`.
    pub async fn search(&self, provider: &str, request: &SearchRequest, mock: bool) -> SearchOutput {
        match self.try_search(provider, request, mock).await {
            Ok(output) => output,
            Err(e) => {
                warn!(provider, query = %request.query, error = %e, "search failed");
                SearchOutput::Text(error_text(&e))
            }
        }
    }
}

/// Inline error string for a failed search.
pub fn error_text(err: &ScoutError) -> String {
    match err {
        ScoutError::Config { message } | ScoutError::Validation { message } => {
            format!("Error: {message}")
        }
        other => format!("Error: {other}"),
    }
}
