//! Page geometry, block styles, colors and font metrics.

use crate::blocks::BlockKind;

// ---------------------------------------------------------------------------
// Geometry (PDF points)
// ---------------------------------------------------------------------------

/// US Letter.
pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;

pub const MARGIN: f32 = 54.0;
pub const HEADER_BAND: f32 = 40.0;
pub const FOOTER_BAND: f32 = 36.0;

pub const CONTENT_LEFT: f32 = MARGIN;
pub const CONTENT_RIGHT: f32 = PAGE_WIDTH - MARGIN;
pub const CONTENT_WIDTH: f32 = CONTENT_RIGHT - CONTENT_LEFT;

/// Baseline of the running header text.
pub const HEADER_BASELINE: f32 = PAGE_HEIGHT - 36.0;
pub const HEADER_RULE_Y: f32 = HEADER_BASELINE - 8.0;

/// Baseline of the running footer text.
pub const FOOTER_BASELINE: f32 = 30.0;
pub const FOOTER_RULE_Y: f32 = FOOTER_BASELINE + 12.0;

/// Body text lives between these two lines.
pub const BODY_TOP: f32 = HEADER_BASELINE - HEADER_BAND;
pub const BODY_BOTTOM: f32 = FOOTER_BASELINE + FOOTER_BAND;

pub const DECORATION_SIZE: f32 = 8.5;

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Components scaled to `0.0..=1.0`.
    pub fn unit(&self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

pub const TITLE_COLOR: Rgb = Rgb::new(0x0f, 0x17, 0x2a);
pub const SUBSECTION_COLOR: Rgb = Rgb::new(0x25, 0x63, 0xeb);
pub const BODY_COLOR: Rgb = Rgb::new(0x1e, 0x29, 0x3b);
pub const QUOTE_COLOR: Rgb = Rgb::new(0x47, 0x55, 0x69);
pub const QUOTE_RULE_COLOR: Rgb = Rgb::new(0xcb, 0xd5, 0xe1);
pub const MUTED_COLOR: Rgb = Rgb::new(0x64, 0x74, 0x8b);
pub const RULE_COLOR: Rgb = Rgb::new(0xe2, 0xe8, 0xf0);
pub const LINK_COLOR: Rgb = Rgb::new(0x25, 0x63, 0xeb);

// ---------------------------------------------------------------------------
// Fonts
// ---------------------------------------------------------------------------

/// Built-in Helvetica faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Regular,
    Bold,
    Oblique,
    BoldOblique,
}

impl Face {
    pub fn with_bold(self, bold: bool) -> Self {
        match (self, bold) {
            (Self::Regular, true) => Self::Bold,
            (Self::Oblique, true) => Self::BoldOblique,
            (face, _) => face,
        }
    }

    fn is_bold(self) -> bool {
        matches!(self, Self::Bold | Self::BoldOblique)
    }
}

/// Helvetica advance widths (1/1000 em) for ASCII 32..=126.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Helvetica-Bold advance widths for ASCII 32..=126.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

fn glyph_width(c: char, bold: bool) -> u16 {
    let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
    match c {
        ' '..='~' => table[c as usize - 32],
        '•' => 350,
        '…' => 1000,
        '—' => 1000,
        '–' => 556,
        '‘' | '’' => {
            if bold {
                278
            } else {
                222
            }
        }
        _ => 556,
    }
}

/// Rendered width of `text` in points.
pub fn text_width(text: &str, face: Face, size: f32) -> f32 {
    let bold = face.is_bold();
    let units: u32 = text.chars().map(|c| u32::from(glyph_width(c, bold))).sum();
    units as f32 * size / 1000.0
}

/// Map text onto what the built-in (WinAnsi) fonts can draw.
///
/// Typographic punctuation is kept, everything else outside Latin-1 is dropped.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\t' => Some(' '),
            ' '..='~' => Some(c),
            '\u{a0}'..='\u{ff}' => Some(c),
            '•' | '…' | '—' | '–' | '‘' | '’' | '“' | '”' | '€' | '™' => Some(c),
            _ => None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Block styles
// ---------------------------------------------------------------------------

/// Paragraph style for one block kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockStyle {
    pub size: f32,
    pub leading: f32,
    pub face: Face,
    pub color: Rgb,
    /// Left edge of wrapped text relative to the content box.
    pub indent: f32,
    pub space_before: f32,
    pub space_after: f32,
}

impl BlockStyle {
    pub fn for_kind(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Title => Self {
                size: 22.0,
                leading: 27.0,
                face: Face::Bold,
                color: TITLE_COLOR,
                indent: 0.0,
                space_before: 4.0,
                space_after: 10.0,
            },
            BlockKind::Subsection => Self {
                size: 15.0,
                leading: 19.0,
                face: Face::Bold,
                color: SUBSECTION_COLOR,
                indent: 0.0,
                space_before: 12.0,
                space_after: 6.0,
            },
            BlockKind::Body => Self {
                size: 10.5,
                leading: 14.5,
                face: Face::Regular,
                color: BODY_COLOR,
                indent: 0.0,
                space_before: 0.0,
                space_after: 6.0,
            },
            BlockKind::Bullet => Self {
                size: 10.5,
                leading: 14.5,
                face: Face::Regular,
                color: BODY_COLOR,
                indent: 14.0,
                space_before: 2.0,
                space_after: 3.0,
            },
            BlockKind::Quote => Self {
                size: 10.0,
                leading: 14.0,
                face: Face::Oblique,
                color: QUOTE_COLOR,
                indent: 18.0,
                space_before: 0.0,
                space_after: 9.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse() {
        assert_eq!(Rgb::from_hex("#d97706"), Some(Rgb::new(0xd9, 0x77, 0x06)));
        assert_eq!(Rgb::from_hex("d97706"), None);
        assert_eq!(Rgb::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn widths_follow_afm() {
        // "Hi" = 722 + 222 in Helvetica.
        assert!((text_width("Hi", Face::Regular, 10.0) - 9.44).abs() < 1e-4);
        // Bold "Hi" = 722 + 278.
        assert!((text_width("Hi", Face::Bold, 10.0) - 10.0).abs() < 1e-4);
        assert_eq!(
            text_width("abc", Face::Oblique, 12.0),
            text_width("abc", Face::Regular, 12.0)
        );
    }

    #[test]
    fn sanitize_drops_emoji() {
        assert_eq!(sanitize("🚨 TL;DR: café • ok"), " TL;DR: café • ok");
        assert_eq!(sanitize("💡 Take"), " Take");
    }
}
