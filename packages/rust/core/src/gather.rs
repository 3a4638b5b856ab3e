//! Data gathering: one search per partner, per competitor, and per fixed pillar.
//!
//! Calls run strictly in sequence. A failed call never aborts the run: partner and
//! competitor failures contribute nothing to the evidence, fixed-pillar failures
//! contribute an explicit error line, and every failure is recorded as a
//! [`GatherFailure`].

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use scout_search::{SearchClient, SearchRequest};
use scout_shared::{Evidence, Roster, SearchMode, SearchTopic, TimeRange};

use crate::pipeline::ProgressReporter;

/// Look-back for the fixed pillars, independent of the requested window.
const PILLAR_DAYS: u32 = 30;

/// Results requested per partner or competitor.
const TARGET_RESULTS: u32 = 5;

/// Caller choices for one gathering run.
#[derive(Debug, Clone)]
pub struct GatherOptions {
    pub time_range: TimeRange,
    /// Provider name; empty selects the configured default.
    pub provider: String,
    pub mock: bool,
    pub mode: SearchMode,
}

impl Default for GatherOptions {
    fn default() -> Self {
        Self {
            time_range: TimeRange::Week,
            provider: String::new(),
            mock: false,
            mode: SearchMode::Deep,
        }
    }
}

/// A search that failed during gathering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatherFailure {
    pub label: String,
    pub provider: String,
    pub error: String,
}

/// Evidence collected by one run plus the calls that failed.
#[derive(Debug, Clone, Default)]
pub struct GatherReport {
    pub evidence: Vec<Evidence>,
    pub failures: Vec<GatherFailure>,
}

// ---------------------------------------------------------------------------
// Query plan
// ---------------------------------------------------------------------------

/// What to do with the evidence stream when a query fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    Skip,
    Placeholder,
}

/// One planned search.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedQuery {
    pub label: String,
    pub query: String,
    pub topic: SearchTopic,
    pub days: u32,
    pub max_results: u32,
    pub on_failure: OnFailure,
}

/// Every search for one run, in execution order.
pub fn plan(roster: &Roster, time_range: TimeRange) -> Vec<PlannedQuery> {
    let days = time_range.days();
    let mut queries = Vec::new();

    for partner in roster.partners() {
        queries.push(PlannedQuery {
            label: format!("{partner} Updates"),
            query: format!("{partner} API developer changelog new features compliance export"),
            topic: SearchTopic::News,
            days,
            max_results: TARGET_RESULTS,
            on_failure: OnFailure::Skip,
        });
    }

    // Vendor fines belong to the regulatory pillar, so they are filtered out here.
    for competitor in roster.competitors() {
        queries.push(PlannedQuery {
            label: format!("{competitor} Activity"),
            query: format!(
                "{competitor} acquisition product launch funding compliance -fine -penalty -settlement -fined"
            ),
            topic: SearchTopic::News,
            days,
            max_results: TARGET_RESULTS,
            on_failure: OnFailure::Skip,
        });
    }

    let leaders = roster
        .competitors()
        .iter()
        .take(3)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" OR ");

    let pillars = [
        (
            "Regulatory Enforcement",
            "SEC FINRA FCA CFTC fines recordkeeping off-channel communications whatsapp enforcement AI artificial intelligence generative".to_string(),
            SearchTopic::News,
            15,
        ),
        (
            "Regulatory Strategic Announcements",
            "SEC Division of Examinations 2026 Priorities press release AI regulation guidance".to_string(),
            SearchTopic::General,
            10,
        ),
        (
            "LinkedIn/Social Discussions",
            format!(
                "site:linkedin.com/pulse OR site:linkedin.com/posts ({leaders} OR Theta Lake) compliance AI"
            ),
            SearchTopic::General,
            10,
        ),
        (
            "Industry Analysis & Blogs",
            format!("{leaders} compliance AI analysis opinion -site:linkedin.com"),
            SearchTopic::General,
            10,
        ),
        (
            "General Market Signals",
            "digital communications governance archiving unified capture AI supervision market news".to_string(),
            SearchTopic::News,
            10,
        ),
    ];

    for (label, query, topic, max_results) in pillars {
        queries.push(PlannedQuery {
            label: label.to_string(),
            query,
            topic,
            days: PILLAR_DAYS,
            max_results,
            on_failure: OnFailure::Placeholder,
        });
    }

    queries
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Run every planned search and collect the evidence.
#[instrument(skip_all, fields(time_range = %opts.time_range, provider = %opts.provider, mock = opts.mock))]
pub async fn gather(
    client: &SearchClient,
    roster: &Roster,
    opts: &GatherOptions,
    progress: &dyn ProgressReporter,
) -> GatherReport {
    let start = Instant::now();
    let queries = plan(roster, opts.time_range);
    let total = queries.len();
    let provider = if opts.provider.trim().is_empty() {
        client.default_provider().to_string()
    } else {
        opts.provider.trim().to_string()
    };

    let mut report = GatherReport::default();

    for (i, planned) in queries.iter().enumerate() {
        let request = SearchRequest::new(planned.query.as_str())
            .topic(planned.topic)
            .days(planned.days)
            .max_results(planned.max_results)
            .mode(opts.mode);

        match client.try_search(&provider, &request, opts.mock).await {
            Ok(output) => {
                debug!(label = %planned.label, "evidence collected");
                report
                    .evidence
                    .push(Evidence::new(planned.label.as_str(), output.to_string()));
            }
            Err(e) => {
                warn!(label = %planned.label, provider = %provider, error = %e, "search failed");
                if planned.on_failure == OnFailure::Placeholder {
                    report
                        .evidence
                        .push(Evidence::failure(planned.label.as_str(), &e));
                }
                report.failures.push(GatherFailure {
                    label: planned.label.clone(),
                    provider: provider.clone(),
                    error: e.to_string(),
                });
            }
        }

        progress.query_done(&planned.label, i + 1, total);
    }

    info!(
        items = report.evidence.len(),
        failures = report.failures.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "gathering complete"
    );

    report
}

// ---------------------------------------------------------------------------
// Prompt form
// ---------------------------------------------------------------------------

/// Render evidence as a bracketed list of quoted, escaped item strings.
pub fn evidence_list(items: &[Evidence]) -> String {
    let rendered: Vec<String> = items.iter().map(Evidence::render).collect();
    format!("{rendered:?}")
}

/// The first `budget` characters of `text`.
pub fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}
