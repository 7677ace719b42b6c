//! PDF evidence: title, status line, one key/value table per request

use crate::naming;
use crate::renderer::{ArtifactRenderer, EvidenceFormat};
use crate::report::EvidenceReport;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Rgb,
};
use scribe_core::{Result, ScribeError};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const VALUE_COLUMN: f32 = 55.0;
const VALUE_WRAP: usize = 80;
const LABEL_WRAP: usize = 22;
const PT_TO_MM: f32 = 0.3528;

const BODY_SIZE: f32 = 9.0;
const HEADING_SIZE: f32 = 12.0;
const TITLE_SIZE: f32 = 14.0;

/// RGB fill, components in `0.0..=1.0`.
type Fill = (f32, f32, f32);

const BLACK: Fill = (0.0, 0.0, 0.0);
const GREEN: Fill = (0.0, 128.0 / 255.0, 0.0);
const RED: Fill = (1.0, 0.0, 0.0);

fn pdf_error(err: impl std::fmt::Display) -> ScribeError {
    ScribeError::RenderError {
        reason: format!("pdf: {err}"),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactRenderer for PdfRenderer {
    fn format(&self) -> EvidenceFormat {
        EvidenceFormat::Pdf
    }

    fn output_path(&self, root: &Path, report: &EvidenceReport) -> PathBuf {
        naming::pdf_path(root, &report.meta, report.generated_at)
    }

    fn write(&self, report: &EvidenceReport, path: &Path) -> Result<()> {
        let (doc, page, layer) =
            PdfDocument::new(report.title(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);
        draw(&doc, layer, report)?;

        let file = File::create(path)?;
        doc.save(&mut BufWriter::new(file)).map_err(pdf_error)
    }
}

/// Lays the report out on `layer` and the pages that follow it. Returns
/// every text run in drawing order with its fill colour.
fn draw(
    doc: &PdfDocumentReference,
    layer: PdfLayerReference,
    report: &EvidenceReport,
) -> Result<Vec<(String, Fill)>> {
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    let mut cursor = Cursor {
        layer,
        doc,
        y: PAGE_HEIGHT - MARGIN,
        fill: BLACK,
        drawn: Vec::new(),
    };

    cursor.centered(&report.title(), TITLE_SIZE, &bold);
    cursor.status_line(report.passed(), &regular, &bold);

    for (index, exchange) in report.exchanges().iter().enumerate() {
        if index > 0 {
            cursor.new_page();
        }
        cursor.gap(4.0);
        cursor.centered(&format!("Request {}", index + 1), HEADING_SIZE, &bold);
        cursor.gap(2.0);
        for (label, value) in exchange.rows() {
            cursor.row(label, &value, &regular, &bold);
        }
    }

    Ok(cursor.drawn)
}

/// Writing position on the current page.
struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    fill: Fill,
    drawn: Vec<(String, Fill)>,
}

impl Cursor<'_> {
    fn line_height(size: f32) -> f32 {
        size * PT_TO_MM * 1.4
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y - height < MARGIN {
            self.new_page();
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn text(&mut self, text: &str, size: f32, x: f32, font: &IndirectFontRef) {
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
        self.drawn.push((text.to_string(), self.fill));
    }

    fn set_fill(&mut self, fill: Fill) {
        let (r, g, b) = fill;
        self.layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
        self.fill = fill;
    }

    fn centered(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        let height = Self::line_height(size);
        self.ensure_room(height);
        self.y -= height;
        let x = ((PAGE_WIDTH - estimated_width(text, size)) / 2.0).max(MARGIN);
        self.text(text, size, x, font);
    }

    fn status_line(&mut self, passed: bool, regular: &IndirectFontRef, bold: &IndirectFontRef) {
        let (label, value, fill) = if passed {
            ("Status: ", "PASSED", GREEN)
        } else {
            ("Status: ", "FAILED", RED)
        };
        let height = Self::line_height(BODY_SIZE + 2.0);
        self.ensure_room(height);
        self.y -= height;

        let size = BODY_SIZE + 2.0;
        let value_x = PAGE_WIDTH - MARGIN - estimated_width(value, size);
        let label_x = value_x - estimated_width(label, size);
        self.text(label, size, label_x, regular);
        self.set_fill(fill);
        self.text(value, size, value_x, bold);
        self.set_fill(BLACK);
    }

    fn row(&mut self, label: &str, value: &str, regular: &IndirectFontRef, bold: &IndirectFontRef) {
        let height = Self::line_height(BODY_SIZE);
        let labels = wrap(label, LABEL_WRAP);
        let values = wrap(value, VALUE_WRAP);
        let lines = labels.len().max(values.len()).max(1);

        self.gap(1.5);
        for i in 0..lines {
            self.ensure_room(height);
            self.y -= height;
            if let Some(line) = labels.get(i) {
                self.text(line, BODY_SIZE, MARGIN, bold);
            }
            if let Some(line) = values.get(i) {
                self.text(line, BODY_SIZE, VALUE_COLUMN, regular);
            }
        }
    }
}

/// Rough Helvetica advance: half an em per character.
fn estimated_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * PT_TO_MM * 0.5
}

/// Splits on newlines, then cuts lines longer than `width` characters,
/// preferring the last space before the limit.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.replace('\t', "    ").lines() {
        let mut rest: Vec<char> = raw.chars().collect();
        while rest.len() > width {
            let cut = rest[..width]
                .iter()
                .rposition(|c| *c == ' ')
                .filter(|pos| *pos > 0)
                .unwrap_or(width);
            lines.push(rest[..cut].iter().collect());
            rest = rest[cut..].iter().skip_while(|c| **c == ' ').copied().collect();
        }
        lines.push(rest.into_iter().collect());
    }
    lines
}
