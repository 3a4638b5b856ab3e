//! Search provider trait and built-in back ends.
//!
//! Each back end issues one request to its own HTTP API and normalizes the native
//! response into a [`SearchOutput`](crate::SearchOutput).

mod brave;
mod exa;
mod perplexity;
mod serper;
mod tavily;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};

use scout_shared::{ProviderEndpoint, Result, ScoutError, Settings};

use crate::{SearchOutput, SearchRequest};

pub use brave::BraveProvider;
pub use exa::ExaProvider;
pub use perplexity::PerplexityProvider;
pub use serper::SerperProvider;
pub use tavily::TavilyProvider;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A search back end addressed by name.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Registry name (`tavily`, `exa`, ...).
    fn name(&self) -> &str;

    /// Issue one request and normalize the response.
    async fn search(&self, http: &Client, request: &SearchRequest) -> Result<SearchOutput>;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Holds registered providers; lookup is by exact (case-insensitive) name.
pub struct ProviderRegistry {
    providers: Vec<Box<dyn SearchProvider>>,
}

impl ProviderRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// All built-in providers configured from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        let search = &settings.config.search;
        let creds = &settings.credentials;

        let mut registry = Self::empty();
        registry.register(TavilyProvider::new(
            Credential::new(&search.tavily, creds.tavily.clone()),
        ));
        registry.register(ExaProvider::new(Credential::new(&search.exa, creds.exa.clone())));
        registry.register(BraveProvider::new(
            Credential::new(&search.brave, creds.brave.clone()),
        ));
        registry.register(SerperProvider::new(
            Credential::new(&search.serper, creds.serper.clone()),
        ));
        registry.register(PerplexityProvider::new(
            Credential::new(&search.perplexity, creds.perplexity.clone()),
        ));
        registry
    }

    /// Add a provider. A later registration with the same name shadows nothing;
    /// the first match wins on lookup.
    pub fn register(&mut self, provider: impl SearchProvider + 'static) {
        self.providers.push(Box::new(provider));
    }

    pub fn get(&self, name: &str) -> Option<&dyn SearchProvider> {
        self.providers
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .map(|p| p.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Endpoint plus the resolved key for one back end.
#[derive(Clone)]
pub struct Credential {
    base_url: String,
    api_key_env: String,
    api_key: Option<String>,
}

impl Credential {
    pub fn new(endpoint: &ProviderEndpoint, api_key: Option<String>) -> Self {
        Self {
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            api_key_env: endpoint.api_key_env.clone(),
            api_key,
        }
    }

    /// Full URL for `path` under the configured base.
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// The key, or a config error naming the env var that should hold it.
    fn key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ScoutError::config(format!("{} not found", self.api_key_env)))
    }
}

/// Send a request and turn transport failures and non-2xx statuses into provider errors.
async fn send(provider: &str, request: RequestBuilder) -> Result<Response> {
    let response = request
        .send()
        .await
        .map_err(|e| ScoutError::Network(format!("{provider}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let body = body.chars().take(300).collect::<String>();
        return Err(ScoutError::provider(provider, format!("status {status}: {body}")));
    }

    Ok(response)
}

/// Parse a successful response body as JSON.
async fn json_body<T: serde::de::DeserializeOwned>(provider: &str, response: Response) -> Result<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| ScoutError::provider(provider, format!("invalid response body: {e}")))
}
