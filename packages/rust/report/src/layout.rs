//! Word wrapping and pagination.
//!
//! Layout is backend-neutral: it produces positioned [`DrawOp`]s per page, which
//! the PDF writer paints verbatim. All coordinates are PDF points with the origin
//! at the bottom-left corner.

use crate::blocks::{Block, BlockKind};
use crate::markup::Span;
use crate::style::{
    BODY_BOTTOM, BODY_TOP, BlockStyle, CONTENT_LEFT, CONTENT_RIGHT, CONTENT_WIDTH,
    DECORATION_SIZE, FOOTER_BASELINE, FOOTER_RULE_Y, Face, HEADER_BASELINE, HEADER_RULE_Y,
    LINK_COLOR, MUTED_COLOR, PAGE_HEIGHT, PAGE_WIDTH, QUOTE_RULE_COLOR, RULE_COLOR, Rgb,
    TITLE_COLOR, sanitize, text_width,
};

/// Fixed strings drawn outside the body flow.
#[derive(Debug, Clone)]
pub struct Frame {
    pub title: String,
    pub subtitle: String,
    /// Shown on the cover page.
    pub timestamp: String,
    /// Shown at the right of every running header.
    pub header_date: String,
    /// Shown at the left of every running footer.
    pub attribution: String,
}

/// One positioned drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        face: Face,
        color: Rgb,
        text: String,
    },
    Rule {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: Rgb,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// All text drawn on the page, in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::Rule { .. } => None,
        })
    }
}

/// Lay out the cover page followed by the body blocks, then decorate every page.
pub fn layout(blocks: &[Block], frame: &Frame) -> Vec<Page> {
    let mut cursor = Cursor::default();
    cover(&mut cursor, frame);

    // Forced break after the cover.
    cursor.new_page();

    for block in blocks {
        place_block(&mut cursor, block);
    }

    let mut pages = cursor.pages;
    let total = pages.len();
    for (index, page) in pages.iter_mut().enumerate() {
        decorate(page, frame, index + 1, total);
    }
    pages
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

struct Cursor {
    pages: Vec<Page>,
    /// Top of the next line on the current page.
    y: f32,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            pages: vec![Page::default()],
            y: BODY_TOP,
        }
    }
}

impl Cursor {
    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = BODY_TOP;
    }

    fn at_top(&self) -> bool {
        (self.y - BODY_TOP).abs() < f32::EPSILON
    }

    /// Start a new page unless `height` still fits.
    fn reserve(&mut self, height: f32) {
        if self.y - height < BODY_BOTTOM && !self.at_top() {
            self.new_page();
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }
}

// ---------------------------------------------------------------------------
// Cover and decorations
// ---------------------------------------------------------------------------

fn cover(cursor: &mut Cursor, frame: &Frame) {
    let mut y = PAGE_HEIGHT * 0.62;

    for line in wrap_plain(&frame.title, Face::Bold, 26.0, CONTENT_WIDTH) {
        centered(cursor, &line, y, 26.0, Face::Bold, TITLE_COLOR);
        y -= 32.0;
    }

    y += 8.0;
    cursor.push(DrawOp::Rule {
        from: (PAGE_WIDTH / 2.0 - 60.0, y),
        to: (PAGE_WIDTH / 2.0 + 60.0, y),
        width: 2.0,
        color: LINK_COLOR,
    });
    y -= 28.0;

    for line in wrap_plain(&frame.subtitle, Face::Regular, 14.0, CONTENT_WIDTH) {
        centered(cursor, &line, y, 14.0, Face::Regular, MUTED_COLOR);
        y -= 18.0;
    }

    y -= 10.0;
    let stamp = format!("Generated: {}", frame.timestamp);
    centered(cursor, &stamp, y, 10.5, Face::Oblique, MUTED_COLOR);
}

fn centered(cursor: &mut Cursor, text: &str, y: f32, size: f32, face: Face, color: Rgb) {
    let width = text_width(text, face, size);
    cursor.push(DrawOp::Text {
        x: ((PAGE_WIDTH - width) / 2.0).max(CONTENT_LEFT),
        y,
        size,
        face,
        color,
        text: text.to_string(),
    });
}

fn decorate(page: &mut Page, frame: &Frame, number: usize, total: usize) {
    let title = sanitize(&frame.title);
    let date = sanitize(&frame.header_date);
    let attribution = sanitize(&frame.attribution);
    let page_label = format!("Page {number} of {total}");

    let date_width = text_width(&date, Face::Regular, DECORATION_SIZE);
    let label_width = text_width(&page_label, Face::Regular, DECORATION_SIZE);

    page.ops.extend([
        DrawOp::Text {
            x: CONTENT_LEFT,
            y: HEADER_BASELINE,
            size: DECORATION_SIZE,
            face: Face::Bold,
            color: TITLE_COLOR,
            text: title.trim().to_string(),
        },
        DrawOp::Text {
            x: CONTENT_RIGHT - date_width,
            y: HEADER_BASELINE,
            size: DECORATION_SIZE,
            face: Face::Regular,
            color: MUTED_COLOR,
            text: date,
        },
        DrawOp::Rule {
            from: (CONTENT_LEFT, HEADER_RULE_Y),
            to: (CONTENT_RIGHT, HEADER_RULE_Y),
            width: 0.75,
            color: RULE_COLOR,
        },
        DrawOp::Rule {
            from: (CONTENT_LEFT, FOOTER_RULE_Y),
            to: (CONTENT_RIGHT, FOOTER_RULE_Y),
            width: 0.75,
            color: RULE_COLOR,
        },
        DrawOp::Text {
            x: CONTENT_LEFT,
            y: FOOTER_BASELINE,
            size: DECORATION_SIZE,
            face: Face::Regular,
            color: MUTED_COLOR,
            text: attribution,
        },
        DrawOp::Text {
            x: CONTENT_RIGHT - label_width,
            y: FOOTER_BASELINE,
            size: DECORATION_SIZE,
            face: Face::Regular,
            color: MUTED_COLOR,
            text: page_label,
        },
    ]);
}

// ---------------------------------------------------------------------------
// Body blocks
// ---------------------------------------------------------------------------

fn place_block(cursor: &mut Cursor, block: &Block) {
    let style = BlockStyle::for_kind(block.kind);
    let available = CONTENT_WIDTH - style.indent;
    let lines = wrap(&block.spans, &style, available);

    if !cursor.at_top() {
        cursor.y -= style.space_before;
    }

    for (index, line) in lines.iter().enumerate() {
        cursor.reserve(style.leading);
        let top = cursor.y;
        let baseline = top - style.size;
        let left = CONTENT_LEFT + style.indent;

        if index == 0 && block.kind == BlockKind::Bullet {
            cursor.push(DrawOp::Text {
                x: CONTENT_LEFT + 2.0,
                y: baseline,
                size: style.size,
                face: Face::Regular,
                color: style.color,
                text: "•".to_string(),
            });
        }

        if block.kind == BlockKind::Quote {
            cursor.push(DrawOp::Rule {
                from: (CONTENT_LEFT + 6.0, top),
                to: (CONTENT_LEFT + 6.0, top - style.leading),
                width: 2.0,
                color: QUOTE_RULE_COLOR,
            });
        }

        for run in line {
            cursor.push(DrawOp::Text {
                x: left + run.x,
                y: baseline,
                size: style.size,
                face: run.face,
                color: run.color,
                text: run.text.clone(),
            });
            if run.link {
                cursor.push(DrawOp::Rule {
                    from: (left + run.x, baseline - 1.5),
                    to: (left + run.x + run.width, baseline - 1.5),
                    width: 0.5,
                    color: run.color,
                });
            }
        }

        cursor.y -= style.leading;
    }

    cursor.y -= style.space_after;
}

// ---------------------------------------------------------------------------
// Wrapping
// ---------------------------------------------------------------------------

/// A styled piece of a word.
#[derive(Debug, Clone)]
struct Fragment {
    text: String,
    face: Face,
    color: Rgb,
    link: bool,
}

/// Fragments with no whitespace between them; the unit of line breaking.
#[derive(Debug, Default)]
struct Cluster {
    fragments: Vec<Fragment>,
}

/// A positioned text run within a line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Run {
    pub(crate) x: f32,
    pub(crate) width: f32,
    pub(crate) text: String,
    pub(crate) face: Face,
    pub(crate) color: Rgb,
    pub(crate) link: bool,
}

fn clusters(spans: &[Span], style: &BlockStyle) -> Vec<Cluster> {
    let mut out: Vec<Cluster> = Vec::new();
    let mut current = Cluster::default();
    let mut pending_break = false;

    for span in spans {
        let text = sanitize(&span.text);
        let face = style.face.with_bold(span.bold);
        let color = span.color.unwrap_or(style.color);
        let link = span.link.is_some();

        let mut word = String::new();
        for c in text.chars() {
            if c.is_whitespace() {
                if !word.is_empty() {
                    current.fragments.push(Fragment {
                        text: std::mem::take(&mut word),
                        face,
                        color,
                        link,
                    });
                }
                pending_break = true;
                continue;
            }
            if pending_break {
                if !current.fragments.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
                pending_break = false;
            }
            word.push(c);
        }
        if !word.is_empty() {
            current.fragments.push(Fragment {
                text: word,
                face,
                color,
                link,
            });
        }
    }

    if !current.fragments.is_empty() {
        out.push(current);
    }
    out
}

pub(crate) fn wrap(spans: &[Span], style: &BlockStyle, max_width: f32) -> Vec<Vec<Run>> {
    let size = style.size;
    let mut lines: Vec<Vec<Run>> = Vec::new();
    let mut line: Vec<Run> = Vec::new();
    let mut x = 0.0_f32;

    for cluster in clusters(spans, style) {
        let width: f32 = cluster
            .fragments
            .iter()
            .map(|f| text_width(&f.text, f.face, size))
            .sum();
        let gap = cluster
            .fragments
            .first()
            .map(|f| text_width(" ", f.face, size))
            .unwrap_or_default();

        if !line.is_empty() && x + gap + width > max_width {
            lines.push(std::mem::take(&mut line));
            x = 0.0;
        }

        if line.is_empty() && width > max_width {
            // Longer than a full line: break between characters.
            for fragment in &cluster.fragments {
                for c in fragment.text.chars() {
                    let mut buf = [0u8; 4];
                    let piece = c.encode_utf8(&mut buf);
                    let w = text_width(piece, fragment.face, size);
                    if x > 0.0 && x + w > max_width {
                        lines.push(std::mem::take(&mut line));
                        x = 0.0;
                    }
                    append(&mut line, fragment, piece, x, size, false);
                    x += w;
                }
            }
            continue;
        }

        let mut leading_space = !line.is_empty();
        if leading_space {
            x += gap;
        }
        for fragment in &cluster.fragments {
            append(&mut line, fragment, &fragment.text, x, size, leading_space);
            x += text_width(&fragment.text, fragment.face, size);
            leading_space = false;
        }
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Add text at `x`, extending the previous run when the style matches.
fn append(line: &mut Vec<Run>, fragment: &Fragment, text: &str, x: f32, size: f32, spaced: bool) {
    if let Some(last) = line.last_mut() {
        let same_style =
            last.face == fragment.face && last.color == fragment.color && last.link == fragment.link;
        if same_style {
            if spaced {
                last.text.push(' ');
            }
            last.text.push_str(text);
            last.width = text_width(&last.text, last.face, size);
            return;
        }
    }
    line.push(Run {
        x,
        width: text_width(text, fragment.face, size),
        text: text.to_string(),
        face: fragment.face,
        color: fragment.color,
        link: fragment.link,
    });
}

/// Wrap unstyled text, returning line strings.
fn wrap_plain(text: &str, face: Face, size: f32, max_width: f32) -> Vec<String> {
    let style = BlockStyle {
        size,
        leading: size,
        face,
        color: TITLE_COLOR,
        indent: 0.0,
        space_before: 0.0,
        space_after: 0.0,
    };
    let span = Span {
        text: text.to_string(),
        bold: false,
        color: None,
        link: None,
    };
    wrap(&[span], &style, max_width)
        .into_iter()
        .map(|runs| runs.into_iter().map(|r| r.text).collect::<Vec<_>>().join(" "))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::parse_blocks;

    fn frame() -> Frame {
        Frame {
            title: "DCGA Scout Strategic Report".into(),
            subtitle: "Partner, Competitor & Regulatory Intelligence".into(),
            timestamp: "2026-10-17 09:00".into(),
            header_date: "October 17, 2026".into(),
            attribution: "Generated by DCGA Scout | Confidential".into(),
        }
    }

    fn body_style() -> BlockStyle {
        BlockStyle::for_kind(BlockKind::Body)
    }

    fn plain(text: &str) -> Vec<Span> {
        vec![Span {
            text: text.into(),
            bold: false,
            color: None,
            link: None,
        }]
    }

    #[test]
    fn short_text_fits_one_line() {
        let lines = wrap(&plain("hello world"), &body_style(), CONTENT_WIDTH);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 1);
        assert_eq!(lines[0][0].text, "hello world");
    }

    #[test]
    fn long_text_wraps_within_width() {
        let text = "compliance ".repeat(80);
        let lines = wrap(&plain(&text), &body_style(), 200.0);
        assert!(lines.len() > 1);
        for line in &lines {
            for run in line {
                assert!(run.x + run.width <= 200.0 + 0.01, "{run:?}");
            }
        }
    }

    #[test]
    fn unbreakable_token_is_split() {
        let url = "https://example.com/".repeat(20);
        let lines = wrap(&plain(&url), &body_style(), 150.0);
        assert!(lines.len() > 1);
        let joined: String = lines.iter().flatten().map(|r| r.text.as_str()).collect();
        assert_eq!(joined, url);
    }

    #[test]
    fn glued_styles_stay_together() {
        let spans = parse_blocks("Foo ([Source](http://x))")[0].spans.clone();
        let lines = wrap(&spans, &body_style(), CONTENT_WIDTH);
        let texts: Vec<&str> = lines[0].iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["Foo (", "Source", ")"]);
        assert!(lines[0][1].link);
        // No gap between "(" and the link.
        let first = &lines[0][0];
        assert!((first.x + first.width - lines[0][1].x).abs() < 0.01);
    }

    #[test]
    fn cover_then_body_on_new_page() {
        let blocks = parse_blocks("# Title\nbody line");
        let pages = layout(&blocks, &frame());
        assert_eq!(pages.len(), 2);
        assert!(pages[0].texts().any(|t| t == "Generated: 2026-10-17 09:00"));
        assert!(!pages[0].texts().any(|t| t == "body line"));
        assert!(pages[1].texts().any(|t| t == "body line"));
    }

    #[test]
    fn every_page_is_decorated() {
        let doc = (0..200)
            .map(|i| format!("* item {i}\n> take {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let pages = layout(&parse_blocks(&doc), &frame());
        assert!(pages.len() > 3);
        let total = pages.len();
        for (i, page) in pages.iter().enumerate() {
            let texts: Vec<&str> = page.texts().collect();
            assert!(texts.contains(&"DCGA Scout Strategic Report"));
            assert!(texts.contains(&"October 17, 2026"));
            assert!(texts.contains(&"Generated by DCGA Scout | Confidential"));
            let label = format!("Page {} of {total}", i + 1);
            assert!(texts.contains(&label.as_str()));
        }
    }

    #[test]
    fn body_text_stays_inside_bands() {
        let doc = "body text that goes on\n".repeat(300);
        let pages = layout(&parse_blocks(&doc), &frame());
        for page in &pages[1..] {
            for op in &page.ops {
                if let DrawOp::Text { y, text, .. } = op {
                    if text == "body text that goes on" {
                        assert!(*y >= BODY_BOTTOM - 1.0 && *y <= BODY_TOP, "y = {y}");
                    }
                }
            }
        }
    }

    #[test]
    fn every_source_line_is_drawn() {
        let doc = "* bullet without take\n> take without bullet\nplain\n### deep heading";
        let pages = layout(&parse_blocks(doc), &frame());
        let texts: Vec<&str> = pages[1].texts().collect();
        for expected in [
            "bullet without take",
            "take without bullet",
            "plain",
            "deep heading",
        ] {
            assert!(texts.contains(&expected), "missing {expected}: {texts:?}");
        }
        assert!(texts.contains(&"•"));
    }
}
