//! Brave Search (web and news endpoints).

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use serde_json::Value;

use scout_shared::{Result, SearchTopic};

use super::{Credential, SearchProvider, json_body, send};
use crate::{SearchHit, SearchOutput, SearchRequest, bullet_list};

/// Brave caps `count` at 20.
const MAX_COUNT: u32 = 20;

pub struct BraveProvider {
    credential: Credential,
}

impl BraveProvider {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }
}

#[async_trait]
impl SearchProvider for BraveProvider {
    fn name(&self) -> &str {
        "brave"
    }

    async fn search(&self, http: &Client, request: &SearchRequest) -> Result<SearchOutput> {
        let key = self.credential.key()?;
        let lane = match request.topic {
            SearchTopic::News => "news",
            SearchTopic::General => "web",
        };
        let count = request.effective_max_results().min(MAX_COUNT).to_string();

        let response = send(
            self.name(),
            http.get(self.credential.url(&format!("/res/v1/{lane}/search")))
                .header("X-Subscription-Token", key)
                .header("Accept", "application/json")
                .query(&[
                    ("q", request.query.as_str()),
                    ("count", count.as_str()),
                    ("freshness", freshness(request.days)),
                ]),
        )
        .await?;

        let raw: Value = json_body(self.name(), response).await?;
        Ok(SearchOutput::Text(bullet_list(&parse_results(&raw))))
    }
}

/// Brave freshness code for a look-back in days.
fn freshness(days: u32) -> &'static str {
    match days {
        0..=1 => "pd",
        2..=7 => "pw",
        8..=31 => "pm",
        _ => "py",
    }
}

/// News responses put hits under `results`, web responses under `web.results`.
fn parse_results(raw: &Value) -> Vec<SearchHit> {
    let items = raw["web"]["results"]
        .as_array()
        .or_else(|| raw["results"].as_array());

    items
        .map(|items| {
            items
                .iter()
                .map(|item| SearchHit {
                    title: strip_html(item["title"].as_str().unwrap_or_default()),
                    url: item["url"].as_str().unwrap_or_default().to_string(),
                    content: strip_html(item["description"].as_str().unwrap_or_default()),
                    score: None,
                    published_date: item["age"].as_str().map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Brave wraps matched terms in `<strong>`; keep only the text.
fn strip_html(fragment: &str) -> String {
    if !fragment.contains('<') && !fragment.contains('&') {
        return fragment.to_string();
    }
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .collect::<String>()
}
