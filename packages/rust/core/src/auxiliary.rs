//! Single-shot helpers that reuse the report model: chat, email drafts, deep dives,
//! and competitor battlecards.
//!
//! Like synthesis, these never fail. Problems come back as `Error: ...` text, or as
//! an `error` entry for the affected battlecard.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use scout_llm::SharedModel;
use scout_search::{SearchClient, SearchRequest, error_text};
use scout_shared::{SearchMode, SearchTopic, Settings};

/// Look-back and depth for on-demand research.
const RESEARCH_DAYS: u32 = 30;
const DEEP_DIVE_RESULTS: u32 = 10;
const BATTLECARD_RESULTS: u32 = 5;

/// SWOT summary for one competitor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Swot {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
    #[serde(default)]
    pub threats: Vec<String>,
}

/// One competitor's card: a SWOT or the reason it could not be built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Battlecard {
    Failed { error: String },
    Swot(Swot),
}

impl Battlecard {
    fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }
}

/// Where an on-demand search goes.
#[derive(Debug, Clone, Default)]
pub struct ResearchTarget {
    pub provider: String,
    pub mock: bool,
}

/// Model-backed helpers sharing the report model handle.
#[derive(Clone)]
pub struct Assistant {
    model: Option<SharedModel>,
    key_env: String,
}

impl Assistant {
    pub fn new(model: Option<SharedModel>, settings: &Settings) -> Self {
        Self {
            model,
            key_env: settings.config.model.api_key_env.clone(),
        }
    }

    fn missing_model(&self) -> String {
        format!("{} not found", self.key_env)
    }

    /// Run one prompt; failures become inline error text prefixed with `what`.
    async fn ask(&self, what: &str, prompt: &str) -> String {
        let Some(model) = &self.model else {
            return format!("Error: {}. Cannot {what}.", self.missing_model());
        };
        match model.generate(prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(task = what, error = %e, "model call failed");
                format!("Error: failed to {what}: {e}")
            }
        }
    }

    /// Answer a question about a generated report.
    #[instrument(skip_all, fields(context_chars = report_context.len()))]
    pub async fn chat(&self, report_context: &str, user_message: &str) -> String {
        let prompt = format!(
            "You are a strategy analyst at Theta Lake answering questions about the market \
             intelligence report below. Answer concisely, cite items from the report where \
             possible, and say so plainly when the report does not cover the question.\n\n\
             REPORT:\n{report_context}\n\nQUESTION:\n{user_message}"
        );
        self.ask("answer the question", &prompt).await
    }

    /// Draft a short outreach email built around one report insight.
    #[instrument(skip_all, fields(recipient = %recipient_name))]
    pub async fn draft_email(&self, insight_text: &str, recipient_name: &str) -> String {
        let recipient = if recipient_name.trim().is_empty() {
            "there"
        } else {
            recipient_name.trim()
        };
        let prompt = format!(
            "Write a brief, professional sales email from a Theta Lake account executive to \
             {recipient}. Build it around the market insight below, connect it to \
             communications compliance and unified capture, and end with a soft call to action. \
             Include a subject line. Keep it under 180 words.\n\nINSIGHT:\n{insight_text}"
        );
        self.ask("draft the email", &prompt).await
    }

    /// Research one topic and summarize what was found.
    #[instrument(skip_all, fields(topic = %topic, provider = %target.provider))]
    pub async fn deep_dive(&self, search: &SearchClient, topic: &str, target: &ResearchTarget) -> String {
        let request = SearchRequest::new(topic)
            .topic(SearchTopic::News)
            .days(RESEARCH_DAYS)
            .max_results(DEEP_DIVE_RESULTS)
            .mode(SearchMode::Deep);

        let results = match search.try_search(&target.provider, &request, target.mock).await {
            Ok(output) => output.to_string(),
            Err(e) => return error_text(&e),
        };

        let prompt = format!(
            "Summarize the latest developments on \"{topic}\" for a Theta Lake strategy briefing. \
             Use Markdown: a two-sentence overview, then up to five bullets each ending with a \
             ([Source](URL)) link, then one blockquote starting with **Theta Lake Take:**.\n\n\
             SEARCH RESULTS:\n{results}"
        );
        self.ask("summarize the topic", &prompt).await
    }

    /// Build one SWOT card per competitor. Each card fails independently.
    #[instrument(skip_all, fields(count = competitors.len(), provider = %target.provider))]
    pub async fn battlecards(
        &self,
        search: &SearchClient,
        competitors: &[String],
        target: &ResearchTarget,
    ) -> BTreeMap<String, Battlecard> {
        let mut cards = BTreeMap::new();

        for name in competitors.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
            let card = self.battlecard(search, name, target).await;
            cards.insert(name.to_string(), card);
        }

        cards
    }

    async fn battlecard(&self, search: &SearchClient, name: &str, target: &ResearchTarget) -> Battlecard {
        let Some(model) = &self.model else {
            return Battlecard::failed(self.missing_model());
        };

        let request = SearchRequest::new(format!(
            "{name} product strategy pricing customers weaknesses compliance archiving"
        ))
        .topic(SearchTopic::General)
        .days(RESEARCH_DAYS)
        .max_results(BATTLECARD_RESULTS);

        let results = match search.try_search(&target.provider, &request, target.mock).await {
            Ok(output) => output.to_string(),
            Err(e) => {
                warn!(competitor = name, error = %e, "battlecard search failed");
                return Battlecard::failed(e.to_string());
            }
        };

        let prompt = format!(
            "You are building a sales battlecard for Theta Lake against {name}. Using the research \
             below, return ONLY a JSON object with the keys \"strengths\", \"weaknesses\", \
             \"opportunities\" and \"threats\", each an array of up to four short strings written \
             from Theta Lake's point of view. No commentary.\n\nRESEARCH:\n{results}"
        );

        match model.generate(&prompt).await {
            Ok(reply) => parse_swot(&reply).unwrap_or_else(|e| {
                warn!(competitor = name, error = %e, "battlecard reply was not valid JSON");
                Battlecard::failed(format!("could not parse battlecard: {e}"))
            }),
            Err(e) => Battlecard::failed(e.to_string()),
        }
    }
}

/// Pull the JSON object out of a reply that may be wrapped in code fences or prose.
fn parse_swot(reply: &str) -> Result<Battlecard, serde_json::Error> {
    let json = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => reply.trim(),
    };
    serde_json::from_str::<Swot>(json).map(Battlecard::Swot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedModel, shared};
    use scout_shared::{AppConfig, Credentials};
    use serde_json::json;
    use wiremock::matchers::{any, body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings() -> Settings {
        Settings::with_credentials(AppConfig::default(), Credentials::default())
    }

    fn search_client(uri: &str) -> SearchClient {
        let mut config = AppConfig::default();
        config.search.tavily.base_url = uri.to_string();
        let creds = Credentials {
            tavily: Some("tv-key".into()),
            ..Credentials::default()
        };
        SearchClient::from_settings(&Settings::with_credentials(config, creds)).unwrap()
    }

    fn mock_target() -> ResearchTarget {
        ResearchTarget {
            provider: String::new(),
            mock: true,
        }
    }

    #[tokio::test]
    async fn chat_without_model_explains_missing_key() {
        let assistant = Assistant::new(None, &settings());
        let answer = assistant.chat("# Report", "What changed?").await;
        assert!(answer.starts_with("Error: GEMINI_API_KEY not found"));
    }

    #[tokio::test]
    async fn chat_embeds_context_and_question() {
        let model = ScriptedModel::fixed(Ok("Zoom shipped an export API."));
        let assistant = Assistant::new(shared(&model), &settings());

        let answer = assistant.chat("# Report\n* Zoom item", "What did Zoom do?").await;

        assert_eq!(answer, "Zoom shipped an export API.");
        let prompt = &model.prompts()[0];
        assert!(prompt.contains("* Zoom item"));
        assert!(prompt.contains("What did Zoom do?"));
    }

    #[tokio::test]
    async fn email_defaults_recipient() {
        let model = ScriptedModel::fixed(Ok("Subject: hi"));
        let assistant = Assistant::new(shared(&model), &settings());

        assistant.draft_email("SEC fines", "  ").await;
        assert!(model.prompts()[0].contains("executive to there."));
    }

    #[tokio::test]
    async fn model_error_becomes_text() {
        let model = ScriptedModel::fixed(Err("boom"));
        let assistant = Assistant::new(shared(&model), &settings());
        let text = assistant.draft_email("x", "Dana").await;
        assert_eq!(text, "Error: failed to draft the email: model error: boom");
    }

    #[tokio::test]
    async fn deep_dive_searches_then_summarizes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "query": "FINRA AI guidance", "days": 30, "max_results": 10 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [ { "title": "FINRA notice", "url": "https://example.com/f", "content": "AI." } ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let model = ScriptedModel::fixed(Ok("summary"));
        let assistant = Assistant::new(shared(&model), &settings());
        let target = ResearchTarget::default();

        let summary = assistant
            .deep_dive(&search_client(&server.uri()), "FINRA AI guidance", &target)
            .await;

        assert_eq!(summary, "summary");
        assert!(model.prompts()[0].contains("FINRA notice"));
    }

    #[tokio::test]
    async fn deep_dive_reports_search_errors() {
        let model = ScriptedModel::fixed(Ok("unused"));
        let assistant = Assistant::new(shared(&model), &settings());
        let target = ResearchTarget {
            provider: "altavista".into(),
            mock: false,
        };

        let text = assistant
            .deep_dive(&search_client("http://127.0.0.1:9"), "topic", &target)
            .await;

        assert_eq!(text, "Error: Unknown search provider 'altavista'");
        assert!(model.prompts().is_empty());
    }

    #[tokio::test]
    async fn battlecards_fail_per_competitor() {
        let model = ScriptedModel::sequence(vec![
            Ok("```json\n{\"strengths\": [\"brand\"], \"weaknesses\": [\"legacy\"], \"opportunities\": [], \"threats\": [\"bundling\"]}\n```"),
            Ok("I cannot help with that."),
        ]);
        let assistant = Assistant::new(shared(&model), &settings());

        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let cards = assistant
            .battlecards(
                &search_client(&server.uri()),
                &["Smarsh".to_string(), "Global Relay".to_string(), " ".to_string()],
                &mock_target(),
            )
            .await;

        assert_eq!(cards.len(), 2);
        assert_eq!(
            cards["Smarsh"],
            Battlecard::Swot(Swot {
                strengths: vec!["brand".into()],
                weaknesses: vec!["legacy".into()],
                opportunities: vec![],
                threats: vec!["bundling".into()],
            })
        );
        assert!(matches!(cards["Global Relay"], Battlecard::Failed { .. }));

        let json = serde_json::to_value(&cards).unwrap();
        assert!(json["Global Relay"]["error"].is_string());
        assert_eq!(json["Smarsh"]["threats"][0], "bundling");
    }

    #[tokio::test]
    async fn battlecards_without_model_mark_every_card() {
        let assistant = Assistant::new(None, &settings());
        let cards = assistant
            .battlecards(
                &search_client("http://127.0.0.1:9"),
                &["Veritas".to_string()],
                &mock_target(),
            )
            .await;
        assert_eq!(
            cards["Veritas"],
            Battlecard::Failed {
                error: "GEMINI_API_KEY not found".into()
            }
        );
    }
}
