//! Report document rendering.
//!
//! Turns a synthesized Markdown report into a paginated PDF:
//! 1. Optionally slice out the requested sections ([`sections`])
//! 2. Classify each non-blank line into a styled block ([`blocks`])
//! 3. Apply inline passes for escaping, bold, links and badges ([`markup`])
//! 4. Wrap and paginate behind a cover page with running header/footer ([`layout`])
//! 5. Paint the pages with printpdf ([`pdf`])

pub mod blocks;
pub mod layout;
pub mod markup;
pub mod pdf;
pub mod sections;
pub mod style;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, info, instrument};

use scout_shared::{ReportConfig, Result, ScoutError, Section};

pub use blocks::{Block, BlockKind, parse_blocks};
pub use layout::{DrawOp, Frame, Page};
pub use markup::Span;
pub use sections::{extract, resolve_names};

/// What to render and how to label it.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub title: String,
    pub subtitle: String,
    pub attribution: String,
    /// Sections to keep; empty keeps the whole document.
    pub sections: Vec<Section>,
    /// Cover-page timestamp. Defaults to the render time.
    pub timestamp: Option<String>,
}

impl RenderOptions {
    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            attribution: config.footer.clone(),
            sections: Vec::new(),
            timestamp: None,
        }
    }

    pub fn sections(mut self, sections: Vec<Section>) -> Self {
        self.sections = sections;
        self
    }

    /// Set the cover timestamp; blank values keep the default.
    pub fn timestamp(mut self, timestamp: Option<String>) -> Self {
        self.timestamp = timestamp.filter(|t| !t.trim().is_empty());
        self
    }

    fn frame(&self, now: DateTime<Local>) -> Frame {
        Frame {
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            timestamp: self
                .timestamp
                .clone()
                .unwrap_or_else(|| now.format("%Y-%m-%d %H:%M").to_string()),
            header_date: now.format("%B %d, %Y").to_string(),
            attribution: self.attribution.clone(),
        }
    }
}

/// Filter, classify and paginate `document` without producing a file.
pub fn layout_document(document: &str, opts: &RenderOptions, now: DateTime<Local>) -> Vec<Page> {
    let filtered = sections::extract(document, &opts.sections);
    let blocks = blocks::parse_blocks(&filtered);
    debug!(blocks = blocks.len(), "classified report lines");
    layout::layout(&blocks, &opts.frame(now))
}

/// Render `document` to PDF bytes.
#[instrument(skip_all, fields(sections = opts.sections.len()))]
pub fn render_to_bytes(document: &str, opts: &RenderOptions) -> Result<Vec<u8>> {
    let pages = layout_document(document, opts, Local::now());
    let bytes = pdf::write_pdf(&opts.title, &pages)?;
    debug!(pages = pages.len(), bytes = bytes.len(), "PDF rendered");
    Ok(bytes)
}

/// Render `document` and write it to `path`, replacing any previous file.
pub fn render_report(document: &str, path: &Path, opts: &RenderOptions) -> Result<PathBuf> {
    let bytes = render_to_bytes(document, opts)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ScoutError::io(parent, e))?;
    }
    std::fs::write(path, &bytes).map_err(|e| ScoutError::io(path, e))?;

    info!(path = %path.display(), bytes = bytes.len(), "report written");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> RenderOptions {
        RenderOptions::from_config(&ReportConfig::default())
    }

    const SAMPLE: &str = "# 🚨 TL;DR: The Weekly Pulse\n\
Quiet week.\n\
## Cooperative & Partner Updates\n\
* **News:** Foo ([Source](http://x)) [Badge: Risk] (Oct 1)\n\
> **💡 Take:** **[Opportunity]** bar & baz <fast>\n\
## Regulatory Radar\n\
* **Event:** SEC fine ([Source](http://sec.example)) (Oct 2)\n\
> **Take:** **[Sales Validation]** cite it\n";

    #[test]
    fn render_produces_pdf_bytes() {
        let bytes = render_to_bytes(SAMPLE, &options()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn render_report_overwrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("dcga_report.pdf");

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"stale").unwrap();

        let written = render_report(SAMPLE, &path, &options()).unwrap();
        assert_eq!(written, path);
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn section_filter_and_timestamp_apply() {
        let opts = options()
            .sections(vec![Section::RegulatoryRadar])
            .timestamp(Some("Q4 review".into()));
        let pages = layout_document(SAMPLE, &opts, Local::now());

        let cover: Vec<&str> = pages[0].texts().collect();
        assert!(cover.contains(&"Generated: Q4 review"));

        let body: Vec<&str> = pages[1..].iter().flat_map(|p| p.texts()).collect();
        assert!(body.contains(&"Regulatory Radar"));
        assert!(!body.iter().any(|t| t.contains("Quiet week")));
    }

    #[test]
    fn blank_timestamp_uses_render_time() {
        let opts = options().timestamp(Some("   ".into()));
        assert!(opts.timestamp.is_none());
    }

    #[test]
    fn literal_markup_characters_are_drawn_as_text() {
        let pages = layout_document(SAMPLE, &options(), Local::now());
        let body: String = pages[1..]
            .iter()
            .flat_map(|p| p.texts())
            .collect::<Vec<_>>()
            .join(" ");
        assert!(body.contains("bar & baz <fast>"));
        assert!(!body.contains("&amp;"));
        assert!(!body.contains("<b>"));
        assert!(!body.contains("<font"));
    }

    #[test]
    fn malformed_markdown_never_fails() {
        let doc = "> take first\n* **unclosed bold\n[Risk](\n## \n#\n<<<>>>";
        let bytes = render_to_bytes(doc, &options()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
