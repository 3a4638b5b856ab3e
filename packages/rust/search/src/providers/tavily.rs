//! Tavily: the default back end and the only one that returns structured results.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use scout_shared::{Result, SearchMode};

use super::{Credential, SearchProvider, json_body, send};
use crate::{SearchHit, SearchOutput, SearchRequest, StructuredResults};

pub struct TavilyProvider {
    credential: Credential,
}

impl TavilyProvider {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }
}

#[derive(Serialize)]
struct TavilyBody<'a> {
    query: &'a str,
    topic: &'a str,
    days: u32,
    max_results: u32,
    search_depth: &'a str,
    include_answer: bool,
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn search(&self, http: &Client, request: &SearchRequest) -> Result<SearchOutput> {
        let key = self.credential.key()?;
        let body = TavilyBody {
            query: &request.query,
            topic: request.topic.as_str(),
            days: request.days,
            max_results: request.effective_max_results(),
            search_depth: match request.mode {
                SearchMode::Fast => "basic",
                SearchMode::Deep => "advanced",
            },
            include_answer: false,
        };

        let response = send(
            self.name(),
            http.post(self.credential.url("/search"))
                .bearer_auth(key)
                .json(&body),
        )
        .await?;

        let raw: Value = json_body(self.name(), response).await?;
        Ok(SearchOutput::Structured(parse_response(&request.query, &raw)))
    }
}

fn parse_response(query: &str, raw: &Value) -> StructuredResults {
    let results = raw["results"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|item| SearchHit {
                    title: item["title"].as_str().unwrap_or_default().to_string(),
                    url: item["url"].as_str().unwrap_or_default().to_string(),
                    content: item["content"].as_str().unwrap_or_default().to_string(),
                    score: item["score"].as_f64(),
                    published_date: item["published_date"].as_str().map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default();

    StructuredResults {
        query: raw["query"].as_str().unwrap_or(query).to_string(),
        answer: raw["answer"].as_str().map(str::to_string),
        results,
        response_time: raw["response_time"].as_f64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_shared::{ProviderEndpoint, SearchTopic};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(uri: &str) -> TavilyProvider {
        let endpoint = ProviderEndpoint {
            api_key_env: "TAVILY_API_KEY".into(),
            base_url: uri.into(),
        };
        TavilyProvider::new(Credential::new(&endpoint, Some("tv-key".into())))
    }

    #[tokio::test]
    async fn posts_query_and_parses_structured_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("authorization", "Bearer tv-key"))
            .and(body_partial_json(json!({
                "query": "Smarsh acquisition",
                "topic": "general",
                "days": 30,
                "max_results": 5,
                "search_depth": "basic"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": "Smarsh acquisition",
                "response_time": 1.2,
                "results": [
                    {
                        "title": "Smarsh buys Y",
                        "url": "https://example.com/y",
                        "content": "Deal closed.",
                        "score": 0.91,
                        "published_date": "2026-10-02"
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = SearchRequest::new("Smarsh acquisition")
            .topic(SearchTopic::General)
            .days(30)
            .max_results(10)
            .mode(SearchMode::Fast);

        let output = provider(&server.uri())
            .search(&Client::new(), &request)
            .await
            .unwrap();

        let SearchOutput::Structured(results) = output else {
            panic!("expected structured output");
        };
        assert_eq!(results.results.len(), 1);
        assert_eq!(results.results[0].title, "Smarsh buys Y");
        assert_eq!(results.results[0].score, Some(0.91));
        assert_eq!(results.response_time, Some(1.2));
    }

    #[tokio::test]
    async fn non_success_status_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = provider(&server.uri())
            .search(&Client::new(), &SearchRequest::new("Zoom"))
            .await
            .unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("tavily error: status 401"), "{text}");
        assert!(text.contains("bad key"));
    }
}
