//! Report synthesis: one prompt, one model call, raw Markdown out.
//!
//! The model output is not validated. Downstream consumers tolerate documents that
//! do not follow the requested layout.

use std::time::Instant;

use tracing::{info, instrument, warn};

use scout_llm::SharedModel;
use scout_shared::{Evidence, Section, Settings, TimeRange};

use crate::gather::{evidence_list, truncate_chars};

/// Single-shot report writer.
#[derive(Clone)]
pub struct Synthesizer {
    model: Option<SharedModel>,
    key_env: String,
    context_budget: usize,
}

impl Synthesizer {
    pub fn new(model: Option<SharedModel>, settings: &Settings) -> Self {
        Self {
            model,
            key_env: settings.config.model.api_key_env.clone(),
            context_budget: settings.config.report.context_budget,
        }
    }

    /// Build the instruction prompt around an already-truncated evidence string.
    pub fn prompt(&self, time_range: TimeRange, evidence: &str) -> String {
        build_prompt(time_range, evidence)
    }

    /// Produce the report. Never fails: a missing or failing model yields an error
    /// document that embeds the raw evidence.
    #[instrument(skip_all, fields(time_range = %time_range, items = evidence.len()))]
    pub async fn synthesize(&self, evidence: &[Evidence], time_range: TimeRange) -> String {
        let raw = evidence_list(evidence);

        let Some(model) = &self.model else {
            warn!(env = %self.key_env, "no model configured, returning raw data");
            return format!("Error: {} not found. Returning raw data...\n{raw}", self.key_env);
        };

        let prompt = self.prompt(time_range, truncate_chars(&raw, self.context_budget));
        let start = Instant::now();

        match model.generate(&prompt).await {
            Ok(report) => {
                info!(
                    model = model.name(),
                    chars = report.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "report synthesized"
                );
                report
            }
            Err(e) => {
                warn!(error = %e, "model call failed, returning raw data");
                format!("Error generating report with Gemini: {e}\n\nFallback Raw Data:\n{raw}")
            }
        }
    }
}

fn period_label(time_range: TimeRange) -> &'static str {
    match time_range {
        TimeRange::Day => "the last 24 hours",
        TimeRange::Week => "the last 7 days",
        TimeRange::Fortnight => "the last 14 days",
        TimeRange::Month => "the last 30 days",
    }
}

fn build_prompt(time_range: TimeRange, evidence: &str) -> String {
    let summary = Section::ExecutiveSummary.header();
    let partners = Section::PartnerUpdates.header();
    let competitive = Section::CompetitiveIntelligence.header();
    let regulatory = Section::RegulatoryRadar.header();
    let industry = Section::IndustryAnalysis.header();
    let period = period_label(time_range);

    format!(
        r#"You are the Chief Strategy Officer of Theta Lake, a digital communications governance and archiving (DCGA) vendor.
Our positions: collaboration should be enabled, not blocked; unified capture beats legacy email archiving; AI needs human-in-the-loop supervision.

Write the "DCGA Scout Strategic Report" covering {period} ({time_range}) from the raw research below.

CURATION RULES
1. Score every raw item for strategic relevance to Theta Lake and keep only the TOP 5 per section.
2. Never repeat a news item across sections. Put it in the single best section.
3. Regulatory Radar is for agency-versus-institution actions (fines, rules, exam priorities from SEC, FINRA, FCA, CFTC and peers).
   Competitive Intelligence is for vendor-versus-vendor moves (launches, funding, acquisitions). An item belongs to exactly one of them.
4. Treat Microsoft Purview as a competitor, not a partner.
5. Prioritize communications compliance (recordkeeping, off-channel messaging), AI governance and DCGA. Ignore generic security news without a governance angle.
6. If "SEC Division of Examinations 2026 Priorities" appears in the data it MUST be included under Regulatory Radar.
7. Prefer at least one non-traditional source (LinkedIn, blog, analyst note) when it is high quality.
8. End every bullet with the publication date in parentheses, e.g. (Oct 14, 2026).
9. Related facts may share one bullet and one take, but a single story must never be split across several bullets.
10. Badges are limited to: [Opportunity], [Risk], [Threat], [Validation], [Sales Validation].

RAW DATA
{evidence}

OUTPUT FORMAT (Markdown, follow exactly; each bullet is immediately followed by one blockquote)

{summary}
(Three to five punchy sentences on the most critical developments.)

{partners}
* **News:** [Summary] ([Source](URL)) (Date)
> **💡 Theta Lake Take:** **[Opportunity/Risk/Threat]** [Strategic perspective]

{competitive}
* **News:** [Summary] ([Source](URL)) (Date)
> **💡 Theta Lake Take:** **[Threat/Validation]** [Strategic perspective]

{regulatory}
* **Event:** [Description] ([Source](URL)) (Date)
> **💡 Theta Lake Take:** **[Sales Validation]** [Sales enablement angle]

{industry}
(Optional: up to 5 analyst, blog or LinkedIn perspectives in the same bullet and blockquote form.)

Every item needs a source link. Keep it professional and precisely formatted."#
    )
}
