//! End-to-end report pipeline: roster → gather → synthesize → render.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info, instrument};

use scout_llm::{SharedModel, model_from_settings};
use scout_report::RenderOptions;
use scout_search::SearchClient;
use scout_shared::{Result, RunId, ScoutError, SearchMode, Settings, TimeRange};

use crate::auxiliary::Assistant;
use crate::gather::{self, GatherFailure, GatherOptions};
use crate::roster::discover_targets;
use crate::speech::SpeechClient;
use crate::synthesis::Synthesizer;

/// Parameters for one report run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub time_range: TimeRange,
    /// Provider name; empty selects the configured default.
    pub provider: String,
    pub mock: bool,
    pub mode: SearchMode,
    /// PDF destination; `None` uses the configured report path.
    pub output: Option<PathBuf>,
}

impl Default for RunRequest {
    fn default() -> Self {
        Self {
            time_range: TimeRange::Week,
            provider: String::new(),
            mock: false,
            mode: SearchMode::Deep,
            output: None,
        }
    }
}

/// Result of one report run.
#[derive(Debug)]
pub struct RunOutcome {
    pub run_id: RunId,
    /// The synthesized Markdown, or an error document embedding the raw evidence.
    pub report: String,
    /// Where the PDF was written; `None` if rendering failed.
    pub pdf_path: Option<PathBuf>,
    pub failures: Vec<GatherFailure>,
    pub elapsed: Duration,
}

/// A synthesized report that has not been rendered yet.
#[derive(Debug)]
pub struct Draft {
    pub run_id: RunId,
    pub report: String,
    pub failures: Vec<GatherFailure>,
    started: Instant,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each search, successful or not.
    fn query_done(&self, label: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, outcome: &RunOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn query_done(&self, _label: &str, _current: usize, _total: usize) {}
    fn done(&self, _outcome: &RunOutcome) {}
}

/// Everything a run or an auxiliary call needs, built once per process.
pub struct Scout {
    settings: Arc<Settings>,
    search: SearchClient,
    synthesizer: Synthesizer,
    assistant: Assistant,
    speech: SpeechClient,
}

impl Scout {
    /// Wire up every collaborator from resolved settings.
    ///
    /// A missing model key is not an error: synthesis and the auxiliaries then
    /// answer with descriptive error text.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let search = SearchClient::from_settings(&settings)?;
        let model = model_from_settings(&settings)?;
        let speech = SpeechClient::from_settings(&settings)?;
        Ok(Self::with_parts(settings, search, model, speech))
    }

    /// Assemble from explicit parts (tests, embedding).
    pub fn with_parts(
        settings: Settings,
        search: SearchClient,
        model: Option<SharedModel>,
        speech: SpeechClient,
    ) -> Self {
        let synthesizer = Synthesizer::new(model.clone(), &settings);
        let assistant = Assistant::new(model, &settings);
        Self {
            settings: Arc::new(settings),
            search,
            synthesizer,
            assistant,
            speech,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn search(&self) -> &SearchClient {
        &self.search
    }

    pub fn synthesizer(&self) -> &Synthesizer {
        &self.synthesizer
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    pub fn speech(&self) -> &SpeechClient {
        &self.speech
    }

    /// Render options built from the `[report]` config.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::from_config(&self.settings.config.report)
    }

    /// Run the full pipeline.
    ///
    /// Never fails: search and model problems are carried in the report text and
    /// `failures`, and a render failure leaves `pdf_path` empty.
    pub async fn run(&self, request: &RunRequest, progress: &dyn ProgressReporter) -> RunOutcome {
        let draft = self.draft(request, progress).await;
        self.publish(draft, request.output.clone(), progress).await
    }

    /// Gather and synthesize without touching the output file.
    #[instrument(skip_all, fields(time_range = %request.time_range, provider = %request.provider, mock = request.mock))]
    pub async fn draft(&self, request: &RunRequest, progress: &dyn ProgressReporter) -> Draft {
        let started = Instant::now();
        let run_id = RunId::new();
        info!(%run_id, "starting report run");

        progress.phase("Discovering targets");
        let roster = discover_targets();

        progress.phase("Gathering intelligence");
        let opts = GatherOptions {
            time_range: request.time_range,
            provider: request.provider.clone(),
            mock: request.mock,
            mode: request.mode,
        };
        let gathered = gather::gather(&self.search, &roster, &opts, progress).await;

        progress.phase("Synthesizing report");
        let report = self
            .synthesizer
            .synthesize(&gathered.evidence, request.time_range)
            .await;

        Draft {
            run_id,
            report,
            failures: gathered.failures,
            started,
        }
    }

    /// Render a draft to `output` (or the configured report path) and close the run.
    pub async fn publish(
        &self,
        draft: Draft,
        output: Option<PathBuf>,
        progress: &dyn ProgressReporter,
    ) -> RunOutcome {
        progress.phase("Rendering PDF");
        let path = output.unwrap_or_else(|| self.settings.config.output.report_pdf.clone());
        let pdf_path = match self.render(&draft.report, path).await {
            Ok(path) => Some(path),
            Err(e) => {
                error!(run_id = %draft.run_id, error = %e, "failed to render report");
                None
            }
        };

        let outcome = RunOutcome {
            run_id: draft.run_id,
            report: draft.report,
            pdf_path,
            failures: draft.failures,
            elapsed: draft.started.elapsed(),
        };

        progress.done(&outcome);

        info!(
            run_id = %outcome.run_id,
            failures = outcome.failures.len(),
            rendered = outcome.pdf_path.is_some(),
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "report run complete"
        );

        outcome
    }

    async fn render(&self, report: &str, path: PathBuf) -> Result<PathBuf> {
        let report = report.to_string();
        let opts = self.render_options();
        tokio::task::spawn_blocking(move || scout_report::render_report(&report, &path, &opts))
            .await
            .map_err(|e| ScoutError::Render(format!("render task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::testing::{ScriptedModel, shared};
    use scout_search::MOCK_RESULT;
    use scout_shared::{AppConfig, Credentials};

    #[derive(Default)]
    struct Recorder {
        phases: Mutex<Vec<String>>,
        queries: Mutex<Vec<(usize, usize)>>,
        finished: Mutex<bool>,
    }

    impl ProgressReporter for Recorder {
        fn phase(&self, name: &str) {
            self.phases.lock().unwrap().push(name.to_string());
        }
        fn query_done(&self, _label: &str, current: usize, total: usize) {
            self.queries.lock().unwrap().push((current, total));
        }
        fn done(&self, _outcome: &RunOutcome) {
            *self.finished.lock().unwrap() = true;
        }
    }

    fn scout(model: Option<SharedModel>) -> Scout {
        let settings = Settings::with_credentials(AppConfig::default(), Credentials::default());
        let search = SearchClient::from_settings(&settings).unwrap();
        let speech = SpeechClient::new(reqwest::Client::new(), "http://127.0.0.1:9", "en");
        Scout::with_parts(settings, search, model, speech)
    }

    fn mock_request(out: PathBuf) -> RunRequest {
        RunRequest {
            mock: true,
            output: Some(out),
            ..RunRequest::default()
        }
    }

    #[tokio::test]
    async fn mock_run_without_model_still_renders() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("dcga_report.pdf");

        let outcome = scout(None)
            .run(&mock_request(out.clone()), &SilentProgress)
            .await;

        assert!(outcome.report.starts_with("Error: GEMINI_API_KEY not found"));
        assert!(outcome.report.contains(MOCK_RESULT.lines().next().unwrap()));
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.pdf_path.as_deref(), Some(out.as_path()));
        assert!(std::fs::read(&out).unwrap().starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn model_report_flows_to_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let model = ScriptedModel::fixed(Ok(
            "# 🚨 TL;DR: The Weekly Pulse\nQuiet week.\n\n## 🤝 Partner Updates\n* **News:** Zoom ([Source](http://x))\n> **💡 Theta Lake Take:** **[Opportunity]** Go.",
        ));

        let outcome = scout(shared(&model))
            .run(&mock_request(dir.path().join("r.pdf")), &SilentProgress)
            .await;

        assert!(outcome.report.starts_with("# 🚨 TL;DR"));
        assert!(outcome.pdf_path.is_some());
        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("--- Zoom Updates ---"));
    }

    #[tokio::test]
    async fn progress_sees_every_query_and_phase() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();

        scout(None)
            .run(&mock_request(dir.path().join("r.pdf")), &recorder)
            .await;

        let queries = recorder.queries.lock().unwrap().clone();
        assert_eq!(queries.len(), 25);
        assert_eq!(queries.last(), Some(&(25, 25)));
        assert_eq!(
            recorder.phases.lock().unwrap().as_slice(),
            [
                "Discovering targets",
                "Gathering intelligence",
                "Synthesizing report",
                "Rendering PDF"
            ]
        );
        assert!(*recorder.finished.lock().unwrap());
    }

    #[tokio::test]
    async fn render_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let outcome = scout(None)
            .run(&mock_request(blocker.join("r.pdf")), &SilentProgress)
            .await;

        assert!(outcome.pdf_path.is_none());
        assert!(outcome.report.starts_with("Error:"));
    }

    #[tokio::test]
    async fn draft_leaves_output_untouched_until_published() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("dcga_report.pdf");
        let recorder = Recorder::default();
        let scout = scout(None);

        let draft = scout.draft(&mock_request(out.clone()), &recorder).await;
        assert!(draft.report.starts_with("Error: GEMINI_API_KEY not found"));
        assert!(!out.exists());
        assert!(!*recorder.finished.lock().unwrap());
        assert_eq!(recorder.phases.lock().unwrap().len(), 3);

        let run_id = draft.run_id.clone();
        let outcome = scout.publish(draft, Some(out.clone()), &recorder).await;
        assert_eq!(outcome.run_id, run_id);
        assert_eq!(outcome.pdf_path.as_deref(), Some(out.as_path()));
        assert!(*recorder.finished.lock().unwrap());
        assert_eq!(
            recorder.phases.lock().unwrap().last().map(String::as_str),
            Some("Rendering PDF")
        );
    }
}
