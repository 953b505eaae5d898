//! # PDF Renderer
//!
//! Lays a report out as a list of marks per page, then draws the marks with
//! `printpdf` using the built-in Helvetica faces. No fonts are embedded.
//!
//! ## Page Layout (A4, millimetres)
//! ```text
//! ┌──────────────────────────────────────────────┐ 297
//! │  Sales Report                  (bold 16)     │
//! │  Command: ventas agrupadas por producto      │
//! │  Generated: 2024-06-10 09:30                 │
//! │                                              │
//! │   product_name   quantity   total_amount     │ ← bold header, repeated
//! │  ════════════════════════════════════════    │   on every page
//! │   Mouse          3          45.00            │
//! │  ────────────────────────────────────────    │
//! └──────────────────────────────────────────────┘ 0
//! ```

use printpdf::{BuiltinFont, Color, Greyscale, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};

use super::{cell_text, columns, info_lines, RenderError, ReportRenderer, NO_DATA_MESSAGE};
use smartsales_core::report::{ReportMetadata, ReportRow};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 18.0;
const ROW_HEIGHT: f32 = 6.0;
const CELL_PADDING: f32 = 1.2;
const BODY_SIZE: f32 = 9.0;

/// Millimetres per typographic point.
const MM_PER_PT: f32 = 0.3528;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.55;

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfRenderer;

impl ReportRenderer for PdfRenderer {
    fn render(&self, rows: &[ReportRow], meta: &ReportMetadata) -> Result<Vec<u8>, RenderError> {
        let pages = layout(rows, meta);
        draw(meta.report_type.title(), &pages)
    }

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn file_extension(&self) -> &'static str {
        "pdf"
    }
}

// =============================================================================
// Layout
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Regular,
    Bold,
}

/// One thing drawn on a page. Coordinates are millimetres from the bottom
/// left corner; `y` of a text mark is its baseline.
#[derive(Debug, Clone, PartialEq)]
enum Mark {
    Text {
        face: Face,
        size: f32,
        x: f32,
        y: f32,
        text: String,
    },
    Rule {
        y: f32,
        heavy: bool,
    },
}

type Page = Vec<Mark>;

fn layout(rows: &[ReportRow], meta: &ReportMetadata) -> Vec<Page> {
    let mut cursor = Cursor::new();

    cursor.text(Face::Bold, 16.0, MARGIN, meta.report_type.title());
    cursor.advance(10.0);
    for (label, value) in info_lines(meta) {
        cursor.text(Face::Regular, 10.0, MARGIN, &format!("{label}: {value}"));
        cursor.advance(5.0);
    }
    cursor.advance(4.0);

    let headers = columns(rows);
    if headers.is_empty() {
        cursor.text(Face::Regular, 10.0, MARGIN, NO_DATA_MESSAGE);
        return cursor.finish();
    }

    let col_width = (PAGE_WIDTH - 2.0 * MARGIN) / headers.len() as f32;
    cursor.row(Face::Bold, &headers, col_width);
    for row in rows {
        if cursor.needs_page_break() {
            cursor.new_page();
            cursor.row(Face::Bold, &headers, col_width);
        }
        let cells: Vec<String> = headers
            .iter()
            .map(|h| row.get(h).map(cell_text).unwrap_or_default())
            .collect();
        cursor.row(Face::Regular, &cells, col_width);
    }
    cursor.finish()
}

/// Fills pages top to bottom.
struct Cursor {
    pages: Vec<Page>,
    current: Page,
    /// Top of the next line.
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Cursor {
            pages: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn advance(&mut self, dy: f32) {
        self.y -= dy;
    }

    fn needs_page_break(&self) -> bool {
        self.y - ROW_HEIGHT < MARGIN
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn text(&mut self, face: Face, size: f32, x: f32, text: &str) {
        self.current.push(Mark::Text {
            face,
            size,
            x,
            y: self.y,
            text: flatten(text),
        });
    }

    /// A table row; bold rows are headers and get a heavy rule.
    fn row(&mut self, face: Face, cells: &[String], col_width: f32) {
        let baseline = self.y - ROW_HEIGHT + 1.8;
        let glyph = BODY_SIZE * MM_PER_PT * AVG_GLYPH_WIDTH;
        let max_chars = ((col_width - 2.0 * CELL_PADDING) / glyph).max(1.0) as usize;
        for (i, cell) in cells.iter().enumerate() {
            self.current.push(Mark::Text {
                face,
                size: BODY_SIZE,
                x: MARGIN + i as f32 * col_width + CELL_PADDING,
                y: baseline,
                text: truncate(&flatten(cell), max_chars),
            });
        }
        self.y -= ROW_HEIGHT;
        self.current.push(Mark::Rule {
            y: self.y,
            heavy: face == Face::Bold,
        });
    }

    fn finish(mut self) -> Vec<Page> {
        self.pages.push(self.current);
        self.pages
    }
}

/// Control characters have no glyph; a cell is a single line.
fn flatten(text: &str) -> String {
    text.chars().map(|c| if c.is_control() { ' ' } else { c }).collect()
}

/// Shortens `text` to `max` characters, marking the cut with `..`.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(2);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("..");
    out
}

// =============================================================================
// Drawing
// =============================================================================

fn draw(title: &str, pages: &[Page]) -> Result<Vec<u8>, RenderError> {
    let (doc, first_page, first_layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Report");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    for (i, marks) in pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Report");
            doc.get_page(page).get_layer(layer)
        };
        for mark in marks {
            draw_mark(&layer, mark, &regular, &bold);
        }
    }

    Ok(doc.save_to_bytes()?)
}

fn draw_mark(layer: &PdfLayerReference, mark: &Mark, regular: &IndirectFontRef, bold: &IndirectFontRef) {
    match mark {
        Mark::Text { face, size, x, y, text } => {
            let font = match face {
                Face::Regular => regular,
                Face::Bold => bold,
            };
            layer.use_text(text.as_str(), *size, Mm(*x), Mm(*y), font);
        }
        Mark::Rule { y, heavy } => {
            let (grey, thickness) = if *heavy { (0.2, 1.0) } else { (0.75, 0.5) };
            layer.set_outline_color(Color::Greyscale(Greyscale::new(grey, None)));
            layer.set_outline_thickness(thickness);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(MARGIN), Mm(*y)), false),
                    (Point::new(Mm(PAGE_WIDTH - MARGIN), Mm(*y)), false),
                ],
                is_closed: false,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_rows::{meta, rows};
    use smartsales_core::report::GroupBy;

    fn texts(page: &Page) -> Vec<&str> {
        page.iter()
            .filter_map(|mark| match mark {
                Mark::Text { text, .. } => Some(text.as_str()),
                Mark::Rule { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_layout_of_small_report() {
        let pages = layout(&rows(3), &meta(GroupBy::Product));
        assert_eq!(pages.len(), 1);

        let page = texts(&pages[0]);
        assert_eq!(page[0], "Sales Report");
        assert!(page.contains(&"Grouped by: product"));
        assert!(page.contains(&"product_name"));
        assert!(page.contains(&"Producto 2"));
        assert!(page.contains(&"37.50"));
        // header rule + one rule per row
        let rules = pages[0].iter().filter(|m| matches!(m, Mark::Rule { .. })).count();
        assert_eq!(rules, 4);
    }

    #[test]
    fn test_empty_report_placeholder() {
        let pages = layout(&[], &meta(GroupBy::None));
        assert_eq!(pages.len(), 1);
        assert!(texts(&pages[0]).contains(&NO_DATA_MESSAGE));
        assert!(!pages[0].iter().any(|m| matches!(m, Mark::Rule { .. })));
    }

    #[test]
    fn test_long_reports_paginate_with_repeated_header() {
        let pages = layout(&rows(120), &meta(GroupBy::None));
        assert!(pages.len() >= 3, "expected several pages, got {}", pages.len());
        for page in &pages {
            assert_eq!(texts(page).iter().filter(|t| **t == "product_name").count(), 1);
            let lowest = page
                .iter()
                .filter_map(|m| match m {
                    Mark::Rule { y, .. } => Some(*y),
                    Mark::Text { .. } => None,
                })
                .fold(f32::MAX, f32::min);
            assert!(lowest >= MARGIN);
        }
        let body_rows: usize = pages
            .iter()
            .map(|p| p.iter().filter(|m| matches!(m, Mark::Rule { heavy: false, .. })).count())
            .sum();
        assert_eq!(body_rows, 120);
    }

    #[test]
    fn test_render_produces_pdf() {
        let pdf = PdfRenderer.render(&rows(40), &meta(GroupBy::Product)).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));

        let empty = PdfRenderer.render(&[], &meta(GroupBy::None)).unwrap();
        assert!(empty.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_cell_text_cleanup() {
        assert_eq!(flatten("a\nb\tc"), "a b c");
        assert_eq!(flatten("Año €"), "Año €");
        assert_eq!(truncate("Auriculares Bluetooth", 8), "Auricu..");
        assert_eq!(truncate("Mouse", 8), "Mouse");
    }
}
