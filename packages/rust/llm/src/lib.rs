//! Generative model client.
//!
//! Scout talks to one hosted model through the [`GenerativeModel`] trait. The
//! production implementation is [`GeminiModel`], a thin REST client for the
//! `generateContent` endpoint. A missing API key is not an error here: callers get
//! `None` from [`GeminiModel::from_settings`] and degrade to their raw-data fallbacks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use scout_shared::{Result, ScoutError, Settings};

/// Shared handle to whichever model is configured.
pub type SharedModel = Arc<dyn GenerativeModel>;

/// A text-in, text-out generative model.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Model identifier, for logs.
    fn name(&self) -> &str;

    /// Generate a completion for a single-turn prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default, rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

// ---------------------------------------------------------------------------
// GeminiModel
// ---------------------------------------------------------------------------

/// REST client for Gemini `generateContent`.
pub struct GeminiModel {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiModel {
    pub fn new(http: Client, base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Build the configured model, or `None` when no API key is available.
    pub fn from_settings(settings: &Settings) -> Result<Option<Self>> {
        let Some(key) = settings.credentials.gemini.as_deref() else {
            warn!(
                env = %settings.config.model.api_key_env,
                "model API key not set, synthesis will fall back to raw data"
            );
            return Ok(None);
        };

        let model = &settings.config.model;
        let http = Client::builder()
            .timeout(Duration::from_secs(model.timeout_secs))
            .build()
            .map_err(|e| ScoutError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Some(Self::new(http, &model.base_url, &model.model, key)))
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    fn name(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model, prompt_chars = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let start = Instant::now();
        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| ScoutError::Model(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text = text.chars().take(300).collect::<String>();
            return Err(ScoutError::Model(format!("status {status}: {text}")));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ScoutError::Model(format!("invalid response body: {e}")))?;

        let text = extract_text(parsed)?;
        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            chars = text.len(),
            "generation complete"
        );
        Ok(text)
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateResponse) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ScoutError::Model("response contained no candidates".into()))?;

    let text = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
        return Err(ScoutError::Model(format!(
            "empty completion (finish reason: {reason})"
        )));
    }

    Ok(text)
}

/// Build the shared model handle for the process, if a key is configured.
pub fn model_from_settings(settings: &Settings) -> Result<Option<SharedModel>> {
    Ok(GeminiModel::from_settings(settings)?.map(|m| Arc::new(m) as SharedModel))
}
