//! Slice named sections out of a synthesized report.
//!
//! A section starts at a line holding exactly its header text and runs until the
//! next line that opens an H2 (`"\n## "`), or to the end of the document.

use std::collections::BTreeSet;

use scout_shared::Section;

/// Marker that terminates every section body.
const SECTION_BREAK: &str = "\n## ";

/// Copy the requested sections out of `document` in canonical order.
///
/// An empty selection returns the document unchanged. Sections whose header is
/// not present are skipped without a placeholder.
pub fn extract(document: &str, wanted: &[Section]) -> String {
    if wanted.is_empty() {
        return document.to_string();
    }

    let wanted: BTreeSet<Section> = wanted.iter().copied().collect();

    wanted
        .into_iter()
        .filter_map(|section| slice_section(document, section))
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Resolve caller-supplied section names. Unrecognized names are dropped.
pub fn resolve_names<S: AsRef<str>>(names: &[S]) -> Vec<Section> {
    names
        .iter()
        .filter_map(|name| {
            let section = Section::from_name(name.as_ref());
            if section.is_none() {
                tracing::debug!(name = name.as_ref(), "ignoring unknown section name");
            }
            section
        })
        .collect()
}

fn slice_section(document: &str, section: Section) -> Option<&str> {
    let header = section.header();
    let start = find_header_line(document, header)?;
    let body_from = start + header.len();
    let end = document[body_from..]
        .find(SECTION_BREAK)
        .map(|offset| body_from + offset)
        .unwrap_or(document.len());
    Some(&document[start..end])
}

/// Offset of the first line consisting of `header`, allowing trailing blanks.
fn find_header_line(document: &str, header: &str) -> Option<usize> {
    document.match_indices(header).map(|(at, _)| at).find(|&at| {
        let line_start = at == 0 || document[..at].ends_with('\n');
        let rest = &document[at + header.len()..];
        let line_end = rest
            .split('\n')
            .next()
            .is_none_or(|tail| tail.trim().is_empty());
        line_start && line_end
    })
}
