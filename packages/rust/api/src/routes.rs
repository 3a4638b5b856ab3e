use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use scout_core::{Battlecard, ResearchTarget, RunRequest, SilentProgress};
use scout_shared::{SearchMode, TimeRange};

use super::AppState;

const PDF_URL: &str = "/api/report/pdf";
const PDF_FILENAME: &str = "DCGA_Intelligence_Report.pdf";

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/run", post(run))
        .route("/api/generate_pdf", post(generate_pdf))
        .route("/api/report/pdf", get(download_pdf))
        .route("/api/download_pdf", get(download_pdf))
        .route("/api/chat", post(chat))
        .route("/api/draft_email", post(draft_email))
        .route("/api/deep_dive", post(deep_dive))
        .route("/api/audio", post(audio))
        .route("/api/battlecards", post(battlecards))
        .with_state(state)
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_json(message: impl Into<String>) -> Response {
    Json(ErrorBody {
        error: message.into(),
    })
    .into_response()
}

fn attachment(content_type: &'static str, filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

#[derive(Serialize)]
struct HealthResponse<'a> {
    status: &'static str,
    default_provider: &'a str,
    providers: Vec<&'a str>,
}

async fn health(State(state): State<AppState>) -> Response {
    let search = state.scout.search();
    Json(HealthResponse {
        status: "ok",
        default_provider: search.default_provider(),
        providers: search.provider_names(),
    })
    .into_response()
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunBody {
    #[serde(default)]
    time_range: String,
    #[serde(default)]
    search_provider: String,
    #[serde(default)]
    use_mock_data: bool,
    #[serde(default)]
    search_mode: String,
}

#[derive(Serialize)]
struct RunResponse {
    status: &'static str,
    report: String,
    pdf_url: &'static str,
}

async fn run(State(state): State<AppState>, Json(body): Json<RunBody>) -> Json<RunResponse> {
    let request = RunRequest {
        time_range: TimeRange::parse_lossy(&body.time_range),
        provider: body.search_provider,
        mock: body.use_mock_data,
        mode: SearchMode::parse_lossy(&body.search_mode),
        output: None,
    };

    let draft = state.scout.draft(&request, &SilentProgress).await;
    let outcome = {
        let _guard = state.artifacts.lock().await;
        state.scout.publish(draft, None, &SilentProgress).await
    };

    info!(run_id = %outcome.run_id, failures = outcome.failures.len(), "run served");

    Json(RunResponse {
        status: "success",
        report: outcome.report,
        pdf_url: PDF_URL,
    })
}

#[derive(Deserialize)]
struct GeneratePdfBody {
    #[serde(default)]
    report_text: String,
    #[serde(default)]
    sections: Vec<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

async fn generate_pdf(State(state): State<AppState>, Json(body): Json<GeneratePdfBody>) -> Response {
    let opts = state
        .scout
        .render_options()
        .sections(scout_report::resolve_names(&body.sections))
        .timestamp(body.timestamp);

    let rendered = tokio::task::spawn_blocking(move || {
        scout_report::render_to_bytes(&body.report_text, &opts)
    })
    .await;

    match rendered {
        Ok(Ok(bytes)) => attachment("application/pdf", PDF_FILENAME, bytes),
        Ok(Err(e)) => {
            warn!(error = %e, "PDF generation failed");
            error_json(e.to_string())
        }
        Err(e) => error_json(format!("render task failed: {e}")),
    }
}

async fn download_pdf(State(state): State<AppState>) -> Response {
    let path = &state.scout.settings().config.output.report_pdf;
    match tokio::fs::read(path).await {
        Ok(bytes) => attachment("application/pdf", PDF_FILENAME, bytes),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "report file unavailable");
            error_json("Report not found")
        }
    }
}

// ---------------------------------------------------------------------------
// Auxiliaries
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ChatBody {
    #[serde(default)]
    report_context: String,
    user_message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
}

async fn chat(State(state): State<AppState>, Json(body): Json<ChatBody>) -> Json<ChatResponse> {
    let response = state
        .scout
        .assistant()
        .chat(&body.report_context, &body.user_message)
        .await;
    Json(ChatResponse { response })
}

#[derive(Deserialize)]
struct EmailBody {
    insight_text: String,
    #[serde(default)]
    recipient_name: String,
}

#[derive(Serialize)]
struct EmailResponse {
    email: String,
}

async fn draft_email(State(state): State<AppState>, Json(body): Json<EmailBody>) -> Json<EmailResponse> {
    let email = state
        .scout
        .assistant()
        .draft_email(&body.insight_text, &body.recipient_name)
        .await;
    Json(EmailResponse { email })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeepDiveBody {
    topic: String,
    #[serde(default)]
    search_provider: String,
    #[serde(default)]
    use_mock_data: bool,
}

#[derive(Serialize)]
struct DeepDiveResponse {
    summary: String,
}

async fn deep_dive(State(state): State<AppState>, Json(body): Json<DeepDiveBody>) -> Json<DeepDiveResponse> {
    let target = ResearchTarget {
        provider: body.search_provider,
        mock: body.use_mock_data,
    };
    let summary = state
        .scout
        .assistant()
        .deep_dive(state.scout.search(), &body.topic, &target)
        .await;
    Json(DeepDiveResponse { summary })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BattlecardsBody {
    #[serde(default)]
    competitors: Vec<String>,
    #[serde(default)]
    search_provider: String,
    #[serde(default)]
    use_mock_data: bool,
}

#[derive(Serialize)]
struct BattlecardsResponse {
    cards: BTreeMap<String, Battlecard>,
}

async fn battlecards(
    State(state): State<AppState>,
    Json(body): Json<BattlecardsBody>,
) -> Json<BattlecardsResponse> {
    let target = ResearchTarget {
        provider: body.search_provider,
        mock: body.use_mock_data,
    };
    let cards = state
        .scout
        .assistant()
        .battlecards(state.scout.search(), &body.competitors, &target)
        .await;
    Json(BattlecardsResponse { cards })
}

#[derive(Deserialize)]
struct AudioBody {
    text: String,
}

async fn audio(State(state): State<AppState>, Json(body): Json<AudioBody>) -> Response {
    let path = state.scout.settings().config.output.audio.clone();
    let written = {
        let _guard = state.artifacts.lock().await;
        state.scout.speech().write_briefing(&body.text, &path).await
    };

    match written {
        Ok(bytes) => attachment("audio/mpeg", "dcga_briefing.mp3", bytes),
        Err(e) => {
            warn!(error = %e, "audio briefing failed");
            error_json(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use scout_core::{Scout, SpeechClient};
    use scout_search::SearchClient;
    use scout_shared::{AppConfig, Credentials, Settings};

    fn state(dir: &std::path::Path, speech_url: &str) -> AppState {
        let mut config = AppConfig::default();
        config.output.report_pdf = dir.join("dcga_report.pdf");
        config.output.audio = dir.join("dcga_briefing.mp3");
        let settings = Settings::with_credentials(config, Credentials::default());
        let search = SearchClient::from_settings(&settings).unwrap();
        let speech = SpeechClient::new(reqwest::Client::new(), speech_url, "en");
        AppState::new(Scout::with_parts(settings, search, None, speech))
    }

    fn post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_of(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(state(dir.path(), "http://127.0.0.1:9"));

        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_of(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["default_provider"], "tavily");
        assert_eq!(
            body["providers"],
            serde_json::json!(["tavily", "exa", "brave", "serper", "perplexity"])
        );
    }

    #[tokio::test]
    async fn download_without_report_is_structured_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(state(dir.path(), "http://127.0.0.1:9"));

        let response = app.oneshot(get("/api/download_pdf")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_of(response).await["error"], "Report not found");
    }

    #[tokio::test]
    async fn mock_run_writes_downloadable_report() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(state(dir.path(), "http://127.0.0.1:9"));

        let response = app
            .clone()
            .oneshot(post(
                "/api/run",
                serde_json::json!({ "timeRange": "24h", "useMockData": true }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_of(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["pdf_url"], PDF_URL);
        assert!(
            body["report"]
                .as_str()
                .unwrap()
                .starts_with("Error: GEMINI_API_KEY not found")
        );

        let response = app.oneshot(get("/api/report/pdf")).await.unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn run_waits_for_artifacts_only_to_write() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path(), "http://127.0.0.1:9");
        let app = create_router(state.clone());
        let pdf = dir.path().join("dcga_report.pdf");

        let guard = state.artifacts.lock().await;
        let pending = tokio::spawn(app.oneshot(post(
            "/api/run",
            serde_json::json!({ "timeRange": "7d", "useMockData": true }),
        )));

        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert!(!pending.is_finished());
        assert!(!pdf.exists());

        drop(guard);
        let response = pending.await.unwrap().unwrap();
        assert_eq!(json_of(response).await["status"], "success");
        assert!(std::fs::read(&pdf).unwrap().starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn generate_pdf_returns_binary() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(state(dir.path(), "http://127.0.0.1:9"));

        let response = app
            .oneshot(post(
                "/api/generate_pdf",
                serde_json::json!({
                    "report_text": "# 🚨 TL;DR\nQuiet.\n## Regulatory Radar\n* **Event:** fine & more <x>",
                    "sections": ["Regulatory Radar"],
                    "timestamp": "2026-10-17 09:00"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn auxiliaries_degrade_without_model() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(state(dir.path(), "http://127.0.0.1:9"));

        let response = app
            .clone()
            .oneshot(post(
                "/api/chat",
                serde_json::json!({ "report_context": "r", "user_message": "q" }),
            ))
            .await
            .unwrap();
        let chat = json_of(response).await;
        assert!(chat["response"].as_str().unwrap().starts_with("Error: GEMINI_API_KEY not found"));

        let response = app
            .clone()
            .oneshot(post(
                "/api/draft_email",
                serde_json::json!({ "insight_text": "i", "recipient_name": "Sam" }),
            ))
            .await
            .unwrap();
        assert!(json_of(response).await["email"].as_str().unwrap().starts_with("Error:"));

        let response = app
            .clone()
            .oneshot(post(
                "/api/deep_dive",
                serde_json::json!({ "topic": "off-channel fines", "useMockData": true }),
            ))
            .await
            .unwrap();
        assert!(json_of(response).await["summary"].as_str().unwrap().starts_with("Error:"));

        let response = app
            .oneshot(post(
                "/api/battlecards",
                serde_json::json!({ "competitors": ["Smarsh", "Global Relay"] }),
            ))
            .await
            .unwrap();
        let cards = json_of(response).await;
        assert_eq!(cards["cards"]["Smarsh"]["error"], "GEMINI_API_KEY not found");
        assert!(cards["cards"]["Global Relay"]["error"].is_string());
    }

    #[tokio::test]
    async fn audio_returns_mpeg_and_writes_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let app = create_router(state(dir.path(), &server.uri()));

        let response = app
            .clone()
            .oneshot(post("/api/audio", serde_json::json!({ "text": "## Weekly pulse" })))
            .await
            .unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ID3");
        assert!(dir.path().join("dcga_briefing.mp3").exists());

        let response = app
            .oneshot(post("/api/audio", serde_json::json!({ "text": "  " })))
            .await
            .unwrap();
        assert!(json_of(response).await["error"].is_string());
    }
}
