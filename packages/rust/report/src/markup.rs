//! Inline styling for a single report line.
//!
//! Styling is a fixed sequence of text passes that produce a tiny tag dialect
//! (`<b>`, `<a href>`, `<font color>`), which [`parse`] then turns into styled spans.
//! Escaping must run first so that tags injected by later passes are the only
//! markup left in the string.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use scout_shared::Badge;

use crate::style::{LINK_COLOR, Rgb};

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
    pub color: Option<Rgb>,
    pub link: Option<String>,
}

impl Span {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            color: None,
            link: None,
        }
    }
}

/// Run all inline passes over raw line content.
pub fn to_markup(text: &str) -> String {
    let mut result = escape(text);
    result = bold(&result);
    result = links(&result);
    result = badges(&result);
    result
}

/// Style one line of content into spans.
pub fn style_line(text: &str) -> Vec<Span> {
    parse(&to_markup(text))
}

// ---------------------------------------------------------------------------
// Pass 1: escape
// ---------------------------------------------------------------------------

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

// ---------------------------------------------------------------------------
// Pass 2: **bold**
// ---------------------------------------------------------------------------

fn bold(text: &str) -> String {
    static BOLD_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid regex"));

    BOLD_RE.replace_all(text, "<b>$1</b>").to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: [text](url)
// ---------------------------------------------------------------------------

fn links(text: &str) -> String {
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").expect("valid regex"));

    LINK_RE
        .replace_all(text, r#"<a href="$2">$1</a>"#)
        .to_string()
}

// ---------------------------------------------------------------------------
// Pass 4: badges
// ---------------------------------------------------------------------------

/// Recolor `[Risk]` / `[Badge: Risk]` style tags, keeping the brackets.
fn badges(text: &str) -> String {
    static BADGE_RE: LazyLock<Regex> = LazyLock::new(|| {
        // Longest label first so "Sales Validation" is not read as "Validation".
        Regex::new(r"\[(?:Badge:\s*)?(Sales Validation|Opportunity|Risk|Threat|Validation)\]")
            .expect("valid regex")
    });

    BADGE_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let color = Badge::from_label(&caps[1])
                .map(|b| b.color_hex())
                .unwrap_or("#000000");
            format!(r#"<font color="{color}">{}</font>"#, &caps[0])
        })
        .to_string()
}

// ---------------------------------------------------------------------------
// Tag parser
// ---------------------------------------------------------------------------

/// Split markup into styled spans, decoding entities in text runs.
///
/// Only the tags emitted by the passes above are understood; anything else that
/// looks like a tag is kept as text.
pub fn parse(markup: &str) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    let mut bold_depth = 0usize;
    let mut colors: Vec<Rgb> = Vec::new();
    let mut links: Vec<String> = Vec::new();
    let mut text = String::new();

    let flush = |text: &mut String,
                 spans: &mut Vec<Span>,
                 bold_depth: usize,
                 colors: &[Rgb],
                 links: &[String]| {
        if text.is_empty() {
            return;
        }
        let link = links.last().cloned();
        let color = colors
            .last()
            .copied()
            .or_else(|| link.as_ref().map(|_| LINK_COLOR));
        let span = Span {
            text: unescape(text),
            bold: bold_depth > 0,
            color,
            link,
        };
        text.clear();
        match spans.last_mut() {
            Some(prev)
                if prev.bold == span.bold && prev.color == span.color && prev.link == span.link =>
            {
                prev.text.push_str(&span.text);
            }
            _ => spans.push(span),
        }
    };

    let mut rest = markup;
    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        let tail = &rest[open..];
        let Some(close) = tail.find('>') else {
            text.push_str(tail);
            rest = "";
            break;
        };
        let tag = &tail[1..close];

        match Tag::parse(tag) {
            Some(tag) => {
                flush(&mut text, &mut spans, bold_depth, &colors, &links);
                match tag {
                    Tag::BoldOpen => bold_depth += 1,
                    Tag::BoldClose => bold_depth = bold_depth.saturating_sub(1),
                    Tag::LinkOpen(href) => links.push(unescape(href)),
                    Tag::LinkClose => {
                        links.pop();
                    }
                    Tag::FontOpen(color) => colors.push(color),
                    Tag::FontClose => {
                        colors.pop();
                    }
                }
            }
            None => text.push_str(&tail[..=close]),
        }
        rest = &tail[close + 1..];
    }
    text.push_str(rest);
    flush(&mut text, &mut spans, bold_depth, &colors, &links);

    if spans.is_empty() {
        spans.push(Span::plain(""));
    }
    spans
}

enum Tag<'a> {
    BoldOpen,
    BoldClose,
    LinkOpen(&'a str),
    LinkClose,
    FontOpen(Rgb),
    FontClose,
}

impl<'a> Tag<'a> {
    fn parse(tag: &'a str) -> Option<Self> {
        match tag {
            "b" => return Some(Self::BoldOpen),
            "/b" => return Some(Self::BoldClose),
            "/a" => return Some(Self::LinkClose),
            "/font" => return Some(Self::FontClose),
            _ => {}
        }
        if let Some(href) = attribute(tag, "a href") {
            return Some(Self::LinkOpen(href));
        }
        if let Some(color) = attribute(tag, "font color") {
            return Rgb::from_hex(color).map(Self::FontOpen);
        }
        None
    }
}

/// Value of `name="value"` when the tag is exactly that.
fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    tag.strip_prefix(name)?
        .strip_prefix("=\"")?
        .strip_suffix('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(spans: &[Span]) -> String {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn passes_emit_expected_markup() {
        assert_eq!(
            to_markup("**News:** Foo ([Source](http://x)) [Badge: Risk]"),
            r##"<b>News:</b> Foo (<a href="http://x">Source</a>) <font color="#d97706">[Badge: Risk]</font>"##
        );
    }

    #[test]
    fn escaping_precedes_substitution() {
        let spans = style_line("AT&T says <b>not bold</b> & 1 < 2");
        assert_eq!(text_of(&spans), "AT&T says <b>not bold</b> & 1 < 2");
        assert!(spans.iter().all(|s| !s.bold));

        let markup = to_markup("a < b && **c**");
        assert_eq!(markup, "a &lt; b &amp;&amp; <b>c</b>");
    }

    #[test]
    fn bold_and_badge_nest() {
        let spans = style_line("**Take:** **[Opportunity]** Push capture.");
        assert_eq!(spans[0].text, "Take:");
        assert!(spans[0].bold);
        let badge = spans.iter().find(|s| s.text == "[Opportunity]").unwrap();
        assert!(badge.bold);
        assert_eq!(badge.color, Rgb::from_hex("#16a34a"));
        assert_eq!(spans.last().unwrap().text, " Push capture.");
    }

    #[test]
    fn sales_validation_wins_over_validation() {
        let spans = style_line("[Sales Validation] and [Validation]");
        let sales = spans.iter().find(|s| s.text == "[Sales Validation]").unwrap();
        assert_eq!(sales.color, Rgb::from_hex("#7c3aed"));
        let plain = spans.iter().find(|s| s.text == "[Validation]").unwrap();
        assert_eq!(plain.color, Rgb::from_hex("#6b7280"));
    }

    #[test]
    fn links_are_colored_and_carry_href() {
        let spans = style_line("see [Docs](https://example.com/a?b=1&c=2) now");
        let link = spans.iter().find(|s| s.link.is_some()).unwrap();
        assert_eq!(link.text, "Docs");
        assert_eq!(link.link.as_deref(), Some("https://example.com/a?b=1&c=2"));
        assert_eq!(link.color, Some(LINK_COLOR));
    }

    #[test]
    fn unmatched_markers_stay_literal() {
        let spans = style_line("**unterminated and [half](");
        assert_eq!(text_of(&spans), "**unterminated and [half](");
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn empty_line_yields_one_empty_span() {
        assert_eq!(style_line(""), vec![Span::plain("")]);
    }
}
