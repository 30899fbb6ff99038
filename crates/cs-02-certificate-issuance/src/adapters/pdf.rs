//! # PDF Certificate Renderer
//!
//! One A4 page with 50pt margins: bold centred title, four body fields,
//! oblique centred footer. Built-in Helvetica faces only, so no font files
//! are shipped.
//!
//! Every line is measured with the Helvetica advance widths and wrapped at
//! word boundaries to fit between the margins. A body field keeps at most
//! `MAX_FIELD_LINES` lines and ends in `...` when cut.

use crate::domain::entities::{Certificate, CERTIFICATE_FOOTER, CERTIFICATE_TITLE};
use crate::domain::errors::RenderError;
use crate::ports::outbound::CertificateRenderer;
use printpdf::{BuiltinFont, Mm, PdfDocument};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_PT: f32 = 50.0;
const PT_TO_MM: f32 = 25.4 / 72.0;
const PT_PER_MM: f32 = 72.0 / 25.4;

const TITLE_SIZE: f32 = 20.0;
const BODY_SIZE: f32 = 14.0;
const FOOTER_SIZE: f32 = 12.0;
const LINE_HEIGHT: f32 = 1.2;

const MAX_FIELD_LINES: usize = 3;
const ELLIPSIS: &str = "...";

/// Renders certificates with `printpdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfCertificateRenderer;

impl PdfCertificateRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl CertificateRenderer for PdfCertificateRenderer {
    fn render(&self, certificate: &Certificate) -> Result<Vec<u8>, RenderError> {
        let (doc, page, layer) = PdfDocument::new(
            format!("Certificado de Votación {}", certificate.cedula),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Certificado".to_string(),
        );
        let layer = doc.get_page(page).get_layer(layer);

        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(document_error)?;
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(document_error)?;
        let oblique = doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(document_error)?;

        for line in layout(certificate) {
            let font = match line.face {
                Face::Bold => &bold,
                Face::Regular => &regular,
                Face::Oblique => &oblique,
            };
            layer.use_text(line.text, line.size, Mm(line.x_mm), Mm(line.y_mm), font);
        }

        doc.save_to_bytes().map_err(document_error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Bold,
    Regular,
    Oblique,
}

/// One line of text at its baseline position.
#[derive(Debug, Clone, PartialEq)]
struct PlacedLine {
    text: String,
    size: f32,
    face: Face,
    x_mm: f32,
    y_mm: f32,
}

fn layout(certificate: &Certificate) -> Vec<PlacedLine> {
    let mut cursor = Cursor::new();
    let mut lines = Vec::new();

    for text in wrap(CERTIFICATE_TITLE, TITLE_SIZE) {
        cursor.advance(TITLE_SIZE);
        lines.push(centred(text, TITLE_SIZE, Face::Bold, cursor.y_mm()));
    }
    cursor.skip_lines(2.0, TITLE_SIZE);

    for field in certificate.body_lines() {
        for text in clamp_field(wrap(&field, BODY_SIZE), BODY_SIZE) {
            cursor.advance(BODY_SIZE);
            lines.push(PlacedLine {
                text,
                size: BODY_SIZE,
                face: Face::Regular,
                x_mm: margin_mm(),
                y_mm: cursor.y_mm(),
            });
        }
        cursor.skip_lines(0.5, BODY_SIZE);
    }
    cursor.skip_lines(1.5, BODY_SIZE);

    for text in wrap(CERTIFICATE_FOOTER, FOOTER_SIZE) {
        cursor.advance(FOOTER_SIZE);
        lines.push(centred(text, FOOTER_SIZE, Face::Oblique, cursor.y_mm()));
    }

    lines
}

/// Vertical text position, tracked in points from the top edge.
struct Cursor {
    from_top_pt: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            from_top_pt: MARGIN_PT,
        }
    }

    /// Move down one line of `size`.
    fn advance(&mut self, size: f32) {
        self.from_top_pt += size * LINE_HEIGHT;
    }

    fn skip_lines(&mut self, lines: f32, size: f32) {
        self.from_top_pt += lines * size * LINE_HEIGHT;
    }

    fn y_mm(&self) -> f32 {
        PAGE_HEIGHT_MM - self.from_top_pt * PT_TO_MM
    }
}

fn margin_mm() -> f32 {
    MARGIN_PT * PT_TO_MM
}

/// Width available between the margins, in points.
fn usable_pt() -> f32 {
    PAGE_WIDTH_MM * PT_PER_MM - 2.0 * MARGIN_PT
}

fn centred(text: String, size: f32, face: Face, y_mm: f32) -> PlacedLine {
    let width_pt = text_width_pt(&text, size);
    let x_pt = MARGIN_PT + ((usable_pt() - width_pt) / 2.0).max(0.0);
    PlacedLine {
        text,
        size,
        face,
        x_mm: x_pt * PT_TO_MM,
        y_mm,
    }
}

/// Greedy word wrap to the usable width. A word wider than a whole line is
/// split between characters.
fn wrap(text: &str, size: f32) -> Vec<String> {
    let max_pt = usable_pt();
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width_pt(&candidate, size) <= max_pt {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        for ch in word.chars() {
            current.push(ch);
            if text_width_pt(&current, size) > max_pt {
                current.pop();
                lines.push(std::mem::replace(&mut current, ch.to_string()));
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Keep the first `MAX_FIELD_LINES` lines, ending the last in an ellipsis
/// when anything was dropped.
fn clamp_field(mut lines: Vec<String>, size: f32) -> Vec<String> {
    if lines.len() <= MAX_FIELD_LINES {
        return lines;
    }
    lines.truncate(MAX_FIELD_LINES);
    if let Some(last) = lines.last_mut() {
        while !last.is_empty() && text_width_pt(&format!("{last}{ELLIPSIS}"), size) > usable_pt()
        {
            last.pop();
        }
        last.push_str(ELLIPSIS);
    }
    lines
}

/// Advance width of `text` at `size`, in points.
///
/// Bold is measured with the regular widths; it only sets the short title.
fn text_width_pt(text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(glyph_units).sum();
    units as f32 * size / 1000.0
}

/// Helvetica advance width in 1/1000 em.
fn glyph_units(ch: char) -> u32 {
    match ch {
        '\'' => 191,
        'i' | 'j' | 'l' => 222,
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | '[' | ']' | 'I' | 'f' | 't' => 278,
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 278,
        '(' | ')' | '-' | 'r' => 333,
        '"' => 355,
        '*' => 389,
        'J' | 'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' | 'ý' | 'ÿ' => 500,
        '+' | '<' | '=' | '>' => 584,
        'F' | 'T' | 'Z' => 611,
        '&' | 'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' => 667,
        'Á' | 'À' | 'Â' | 'Ä' | 'É' | 'È' | 'Ê' | 'Ë' | 'Ý' => 667,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' | 'w' => 722,
        'Ñ' | 'Ú' | 'Ù' | 'Û' | 'Ü' | 'Ç' => 722,
        'G' | 'O' | 'Q' | 'Ó' | 'Ò' | 'Ô' | 'Ö' => 778,
        'M' | 'm' => 833,
        '%' => 889,
        'W' => 944,
        '@' => 1015,
        _ => 556,
    }
}

fn document_error<E: std::fmt::Debug>(err: E) -> RenderError {
    RenderError::Document(format!("{err:?}"))
}
