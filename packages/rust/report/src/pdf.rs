//! Paint laid-out pages into a PDF with the built-in Helvetica faces.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point,
};

use scout_shared::{Result, ScoutError};

use crate::layout::{DrawOp, Page};
use crate::style::{Face, PAGE_HEIGHT, PAGE_WIDTH, Rgb};

/// Points to millimetres.
fn mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

fn color(rgb: Rgb) -> Color {
    let (r, g, b) = rgb.unit();
    Color::Rgb(printpdf::Rgb::new(r, g, b, None))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
    bold_oblique: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self> {
        let load = |font: BuiltinFont| {
            doc.add_builtin_font(font)
                .map_err(|e| ScoutError::Render(format!("failed to load built-in font: {e:?}")))
        };
        Ok(Self {
            regular: load(BuiltinFont::Helvetica)?,
            bold: load(BuiltinFont::HelveticaBold)?,
            oblique: load(BuiltinFont::HelveticaOblique)?,
            bold_oblique: load(BuiltinFont::HelveticaBoldOblique)?,
        })
    }

    fn get(&self, face: Face) -> &IndirectFontRef {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
            Face::Oblique => &self.oblique,
            Face::BoldOblique => &self.bold_oblique,
        }
    }
}

/// Serialize `pages` as a PDF document.
pub fn write_pdf(title: &str, pages: &[Page]) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
    let fonts = Fonts::load(&doc)?;

    for (index, page) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) =
                doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), format!("Page {}", index + 1));
            doc.get_page(page_index).get_layer(layer_index)
        };
        paint(&layer, &fonts, page);
    }

    doc.save_to_bytes()
        .map_err(|e| ScoutError::Render(format!("failed to serialize PDF: {e:?}")))
}

fn paint(layer: &PdfLayerReference, fonts: &Fonts, page: &Page) {
    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                size,
                face,
                color: rgb,
                text,
            } => {
                if text.is_empty() {
                    continue;
                }
                layer.set_fill_color(color(*rgb));
                layer.use_text(text.as_str(), *size, mm(*x), mm(*y), fonts.get(*face));
            }
            DrawOp::Rule {
                from,
                to,
                width,
                color: rgb,
            } => {
                layer.set_outline_color(color(*rgb));
                layer.set_outline_thickness(*width);
                layer.add_line(Line {
                    points: vec![
                        (Point::new(mm(from.0), mm(from.1)), false),
                        (Point::new(mm(to.0), mm(to.1)), false),
                    ],
                    is_closed: false,
                });
            }
        }
    }
}
