//! Serper (Google results proxy).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use scout_shared::{Result, SearchTopic};

use super::{Credential, SearchProvider, json_body, send};
use crate::{SearchHit, SearchOutput, SearchRequest, bullet_list};

pub struct SerperProvider {
    credential: Credential,
}

impl SerperProvider {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }
}

#[async_trait]
impl SearchProvider for SerperProvider {
    fn name(&self) -> &str {
        "serper"
    }

    async fn search(&self, http: &Client, request: &SearchRequest) -> Result<SearchOutput> {
        let key = self.credential.key()?;
        let endpoint = match request.topic {
            SearchTopic::News => "/news",
            SearchTopic::General => "/search",
        };
        let body = json!({
            "q": request.query,
            "num": request.effective_max_results(),
            "tbs": time_filter(request.days),
        });

        let response = send(
            self.name(),
            http.post(self.credential.url(endpoint))
                .header("X-API-KEY", key)
                .json(&body),
        )
        .await?;

        let raw: Value = json_body(self.name(), response).await?;
        Ok(SearchOutput::Text(bullet_list(&parse_results(&raw))))
    }
}

/// Google `tbs` recency filter for a look-back in days.
fn time_filter(days: u32) -> &'static str {
    match days {
        0..=1 => "qdr:d",
        2..=7 => "qdr:w",
        8..=31 => "qdr:m",
        _ => "qdr:y",
    }
}

fn parse_results(raw: &Value) -> Vec<SearchHit> {
    let items = raw["news"]
        .as_array()
        .or_else(|| raw["organic"].as_array());

    items
        .map(|items| {
            items
                .iter()
                .map(|item| SearchHit {
                    title: item["title"].as_str().unwrap_or_default().to_string(),
                    url: item["link"].as_str().unwrap_or_default().to_string(),
                    content: item["snippet"].as_str().unwrap_or_default().to_string(),
                    score: None,
                    published_date: item["date"].as_str().map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default()
}
