//! Perplexity Sonar: an answer engine, so the output is prose plus citations.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use scout_shared::{Result, ScoutError, SearchMode};

use super::{Credential, SearchProvider, json_body, send};
use crate::{SearchOutput, SearchRequest};

pub struct PerplexityProvider {
    credential: Credential,
}

impl PerplexityProvider {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }
}

#[async_trait]
impl SearchProvider for PerplexityProvider {
    fn name(&self) -> &str {
        "perplexity"
    }

    async fn search(&self, http: &Client, request: &SearchRequest) -> Result<SearchOutput> {
        let key = self.credential.key()?;
        let model = match request.mode {
            SearchMode::Fast => "sonar",
            SearchMode::Deep => "sonar-pro",
        };
        let body = json!({
            "model": model,
            "messages": [
                {
                    "role": "system",
                    "content": format!(
                        "Report recent, sourced developments as concise bullet points. \
                         Include at most {} items.",
                        request.effective_max_results()
                    ),
                },
                { "role": "user", "content": request.query },
            ],
            "search_recency_filter": recency_filter(request.days),
        });

        let response = send(
            self.name(),
            http.post(self.credential.url("/chat/completions"))
                .bearer_auth(key)
                .json(&body),
        )
        .await?;

        let raw: Value = json_body(self.name(), response).await?;
        render(&raw).map(SearchOutput::Text)
    }
}

fn recency_filter(days: u32) -> &'static str {
    match days {
        0..=1 => "day",
        2..=7 => "week",
        8..=31 => "month",
        _ => "year",
    }
}

fn render(raw: &Value) -> Result<String> {
    let content = raw["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| ScoutError::provider("perplexity", "response had no message content"))?;

    let mut text = content.trim().to_string();
    if let Some(citations) = raw["citations"].as_array() {
        let sources = citations
            .iter()
            .filter_map(Value::as_str)
            .enumerate()
            .map(|(i, url)| format!("- **Source {}** ({url})", i + 1))
            .collect::<Vec<_>>();
        if !sources.is_empty() {
            text.push_str("\n\n");
            text.push_str(&sources.join("\n"));
        }
    }
    Ok(text)
}
