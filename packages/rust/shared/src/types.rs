//! Core domain types for Scout reports.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one report generation (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Time window
// ---------------------------------------------------------------------------

/// Reporting period requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "14d")]
    Fortnight,
    #[serde(rename = "30d")]
    Month,
}

impl TimeRange {
    /// Parse a wire value. Anything unrecognized maps to the 7-day window.
    pub fn parse_lossy(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "24h" => Self::Day,
            "7d" => Self::Week,
            "14d" => Self::Fortnight,
            "30d" => Self::Month,
            other => {
                tracing::debug!(value = other, "unrecognized time range, using 7d");
                Self::Week
            }
        }
    }

    /// Wire value (`24h`, `7d`, `14d`, `30d`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "24h",
            Self::Week => "7d",
            Self::Fortnight => "14d",
            Self::Month => "30d",
        }
    }

    /// Look-back in days used for every roster search.
    pub fn days(&self) -> u32 {
        match self {
            Self::Day => 1,
            Self::Week => 7,
            Self::Fortnight => 14,
            Self::Month => 30,
        }
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::Week
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Search options
// ---------------------------------------------------------------------------

/// Search lane: dated news or the general web index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchTopic {
    News,
    General,
}

impl SearchTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::News => "news",
            Self::General => "general",
        }
    }
}

/// Cost/fidelity trade-off for a search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Fast,
    #[default]
    Deep,
}

impl SearchMode {
    /// Parse a wire value. Anything other than `fast` is the default deep path.
    pub fn parse_lossy(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("fast") {
            Self::Fast
        } else {
            Self::Deep
        }
    }

    /// Apply the fast-mode result reduction.
    pub fn scale_results(&self, max_results: u32) -> u32 {
        match self {
            Self::Fast => (max_results / 2).max(1),
            Self::Deep => max_results.max(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Evidence
// ---------------------------------------------------------------------------

/// One labeled block of provider output destined for the synthesis prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub label: String,
    pub body: String,
    /// Set for placeholders recorded when a fixed pillar's search failed.
    #[serde(default)]
    pub failed: bool,
}

impl Evidence {
    pub fn new(label: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            body: body.into(),
            failed: false,
        }
    }

    /// Placeholder for a search that failed; the body carries the error.
    pub fn failure(label: impl Into<String>, error: impl std::fmt::Display) -> Self {
        let label = label.into();
        Self {
            body: format!("Error fetching {label}: {error}"),
            label,
            failed: true,
        }
    }

    /// Prompt form: a `--- label ---` banner followed by the body. Failure
    /// placeholders render as the bare error line.
    pub fn render(&self) -> String {
        if self.failed {
            self.body.clone()
        } else {
            format!("--- {} ---\n{}", self.label, self.body)
        }
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Partners and competitors to investigate for one run. Read-only after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roster {
    partners: Vec<String>,
    competitors: Vec<String>,
}

impl Roster {
    pub fn new(partners: Vec<String>, competitors: Vec<String>) -> Self {
        Self {
            partners,
            competitors,
        }
    }

    pub fn partners(&self) -> &[String] {
        &self.partners
    }

    pub fn competitors(&self) -> &[String] {
        &self.competitors
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// A top-level division of the final report, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Section {
    ExecutiveSummary,
    PartnerUpdates,
    CompetitiveIntelligence,
    RegulatoryRadar,
    IndustryAnalysis,
}

impl Section {
    /// All sections in canonical document order.
    pub const ALL: [Section; 5] = [
        Section::ExecutiveSummary,
        Section::PartnerUpdates,
        Section::CompetitiveIntelligence,
        Section::RegulatoryRadar,
        Section::IndustryAnalysis,
    ];

    /// Human-readable name used by callers.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ExecutiveSummary => "Executive Summary",
            Self::PartnerUpdates => "Partner Updates",
            Self::CompetitiveIntelligence => "Competitive Intelligence",
            Self::RegulatoryRadar => "Regulatory Radar",
            Self::IndustryAnalysis => "Industry Analysis",
        }
    }

    /// Exact Markdown header the synthesizer is instructed to emit.
    pub fn header(&self) -> &'static str {
        match self {
            Self::ExecutiveSummary => "# 🚨 TL;DR: The Weekly Pulse",
            Self::PartnerUpdates => "## Cooperative & Partner Updates",
            Self::CompetitiveIntelligence => "## Competitive Intelligence",
            Self::RegulatoryRadar => "## Regulatory Radar",
            Self::IndustryAnalysis => "## Industry Analysis & Blogs",
        }
    }

    /// Resolve a caller-supplied name. Accepts the display name or the header title,
    /// case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim();
        Self::ALL.into_iter().find(|s| {
            let title = s.header().trim_start_matches('#').trim();
            wanted.eq_ignore_ascii_case(s.display_name()) || wanted.eq_ignore_ascii_case(title)
        })
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

// ---------------------------------------------------------------------------
// Badges
// ---------------------------------------------------------------------------

/// Display-only classification tag attached to a strategic take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Badge {
    Opportunity,
    Risk,
    Threat,
    Validation,
    SalesValidation,
}

impl Badge {
    pub const ALL: [Badge; 5] = [
        Badge::Opportunity,
        Badge::Risk,
        Badge::Threat,
        Badge::Validation,
        Badge::SalesValidation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Opportunity => "Opportunity",
            Self::Risk => "Risk",
            Self::Threat => "Threat",
            Self::Validation => "Validation",
            Self::SalesValidation => "Sales Validation",
        }
    }

    /// Hex color used at render time.
    pub fn color_hex(&self) -> &'static str {
        match self {
            Self::Opportunity => "#16a34a",
            Self::Risk => "#d97706",
            Self::Threat => "#dc2626",
            Self::Validation => "#6b7280",
            Self::SalesValidation => "#7c3aed",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|b| b.label().eq_ignore_ascii_case(label.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_time_range_falls_back_to_week() {
        assert_eq!(TimeRange::parse_lossy("90d"), TimeRange::Week);
        assert_eq!(TimeRange::parse_lossy(""), TimeRange::Week);
        assert_eq!(TimeRange::parse_lossy("yesterday").days(), 7);
    }

    #[test]
    fn known_time_ranges_map_to_days() {
        assert_eq!(TimeRange::parse_lossy("24h").days(), 1);
        assert_eq!(TimeRange::parse_lossy("14d").days(), 14);
        assert_eq!(TimeRange::parse_lossy(" 30D ").days(), 30);
    }

    #[test]
    fn time_range_serde_uses_wire_values() {
        let json = serde_json::to_string(&TimeRange::Fortnight).unwrap();
        assert_eq!(json, r#""14d""#);
        let parsed: TimeRange = serde_json::from_str(r#""24h""#).unwrap();
        assert_eq!(parsed, TimeRange::Day);
    }

    #[test]
    fn fast_mode_halves_results() {
        assert_eq!(SearchMode::Fast.scale_results(10), 5);
        assert_eq!(SearchMode::Fast.scale_results(1), 1);
        assert_eq!(SearchMode::Deep.scale_results(10), 10);
        assert_eq!(SearchMode::parse_lossy("FAST"), SearchMode::Fast);
        assert_eq!(SearchMode::parse_lossy("whatever"), SearchMode::Deep);
    }

    #[test]
    fn evidence_renders_with_banner() {
        let item = Evidence::new("Zoom Updates", "Error: timeout");
        assert_eq!(item.render(), "--- Zoom Updates ---\nError: timeout");

        let failed = Evidence::failure("Regulatory Enforcement", "network error: reset");
        assert_eq!(
            failed.render(),
            "Error fetching Regulatory Enforcement: network error: reset"
        );
    }

    #[test]
    fn section_names_resolve() {
        assert_eq!(Section::from_name("regulatory radar"), Some(Section::RegulatoryRadar));
        assert_eq!(
            Section::from_name("Cooperative & Partner Updates"),
            Some(Section::PartnerUpdates)
        );
        assert_eq!(Section::from_name("Executive Summary"), Some(Section::ExecutiveSummary));
        assert_eq!(Section::from_name("Weather"), None);
    }

    #[test]
    fn sections_sort_canonically() {
        let mut sections = vec![Section::RegulatoryRadar, Section::ExecutiveSummary];
        sections.sort();
        assert_eq!(sections, vec![Section::ExecutiveSummary, Section::RegulatoryRadar]);
    }

    #[test]
    fn badge_lookup() {
        assert_eq!(Badge::from_label("sales validation"), Some(Badge::SalesValidation));
        assert_eq!(Badge::Risk.color_hex(), "#d97706");
        assert_eq!(Badge::from_label("Maybe"), None);
    }
}
