//! Exa neural search.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde_json::{Value, json};

use scout_shared::{Result, SearchMode, SearchTopic};

use super::{Credential, SearchProvider, json_body, send};
use crate::{SearchHit, SearchOutput, SearchRequest, bullet_list};

/// Per-result text budget requested from Exa.
const MAX_TEXT_CHARS: u32 = 1_000;

pub struct ExaProvider {
    credential: Credential,
}

impl ExaProvider {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }
}

#[async_trait]
impl SearchProvider for ExaProvider {
    fn name(&self) -> &str {
        "exa"
    }

    async fn search(&self, http: &Client, request: &SearchRequest) -> Result<SearchOutput> {
        let key = self.credential.key()?;

        let mut body = json!({
            "query": request.query,
            "numResults": request.effective_max_results(),
            "type": match request.mode {
                SearchMode::Fast => "fast",
                SearchMode::Deep => "auto",
            },
            "startPublishedDate": published_since(Utc::now(), request.days),
            "contents": { "text": { "maxCharacters": MAX_TEXT_CHARS } },
        });
        if request.topic == SearchTopic::News {
            body["category"] = json!("news");
        }

        let response = send(
            self.name(),
            http.post(self.credential.url("/search"))
                .header("x-api-key", key)
                .json(&body),
        )
        .await?;

        let raw: Value = json_body(self.name(), response).await?;
        Ok(SearchOutput::Text(bullet_list(&parse_results(&raw))))
    }
}

/// Lower bound for `startPublishedDate`: exactly `days` before `now`.
fn published_since(now: DateTime<Utc>, days: u32) -> String {
    (now - Duration::days(i64::from(days)))
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

fn parse_results(raw: &Value) -> Vec<SearchHit> {
    raw["results"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|item| SearchHit {
                    title: item["title"].as_str().unwrap_or_default().to_string(),
                    url: item["url"].as_str().unwrap_or_default().to_string(),
                    content: item["text"]
                        .as_str()
                        .or_else(|| item["summary"].as_str())
                        .unwrap_or_default()
                        .to_string(),
                    score: item["score"].as_f64(),
                    published_date: item["publishedDate"]
                        .as_str()
                        .map(|d| d.chars().take(10).collect()),
                })
                .collect()
        })
        .unwrap_or_default()
}
