//! Line classification: one styled block per non-blank source line.

use crate::markup::{self, Span};

/// Paragraph style selected by a line's leading token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Title,
    Subsection,
    Bullet,
    Quote,
    Body,
}

/// A classified, inline-styled line.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub spans: Vec<Span>,
}

impl Block {
    /// Concatenated text of all spans.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Classify a trimmed line and strip its prefix.
///
/// The quote prefix is tested first, on the raw line, so escaping never sees it.
pub fn classify(line: &str) -> (BlockKind, &str) {
    if let Some(rest) = line.strip_prefix("> ") {
        return (BlockKind::Quote, rest);
    }
    if let Some(rest) = line.strip_prefix("* ").or_else(|| line.strip_prefix("- ")) {
        return (BlockKind::Bullet, rest);
    }
    if let Some(rest) = line.strip_prefix("# ") {
        return (BlockKind::Title, rest);
    }
    if let Some(rest) = line
        .strip_prefix("## ")
        .or_else(|| line.strip_prefix("### "))
    {
        return (BlockKind::Subsection, rest);
    }
    (BlockKind::Body, line)
}

/// Split a document into blocks, skipping blank lines.
pub fn parse_blocks(document: &str) -> Vec<Block> {
    document
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let (kind, content) = classify(line);
            Block {
                kind,
                spans: markup::style_line(content.trim()),
            }
        })
        .collect()
}
