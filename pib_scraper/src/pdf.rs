//! Single-document PDF output for article summaries.
//!
//! Text goes through [`sanitize`] first so that everything handed to the renderer is Latin-1:
//! typographic punctuation is mapped to ASCII look-alikes, and only what is left over is
//! replaced with `?`. Pages use the built-in Helvetica faces, so nothing is embedded.

use crate::error::Result;
use lopdf::content::Content;
use lopdf::{Document, Object};
use printpdf::{
    BuiltinFont, Layer, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Pt, TextItem, TextMatrix,
    TextRenderingMode,
};

const REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2013}', "-"),
    ('\u{2014}', "--"),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201c}', "\""),
    ('\u{201d}', "\""),
    ('\u{2022}', "*"),
    ('\u{2026}', "..."),
    ('\u{20b9}', "Rs "),
];

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 10.0;
const BOTTOM_MARGIN_MM: f32 = 20.0;
const TEXT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;

const TITLE_SIZE_PT: f32 = 16.0;
const TITLE_LINE_MM: f32 = 10.0;
const TITLE_GAP_MM: f32 = 10.0;
const BODY_SIZE_PT: f32 = 12.0;
const BODY_LINE_MM: f32 = 8.0;

const PT_PER_MM: f32 = 72.0 / 25.4;
// Average Helvetica advance widths as a fraction of the font size.
const REGULAR_CHAR_EM: f32 = 0.5;
const BOLD_CHAR_EM: f32 = 0.56;

/// Maps typographic characters to ASCII, then replaces anything outside Latin-1 with `?`.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match REPLACEMENTS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => out.push_str(to),
            None if (c as u32) <= 0xFF => out.push(c),
            None => out.push('?'),
        }
    }
    out
}

/// One line of text at an absolute position, `y_mm` being the baseline from the page bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x_mm: f32,
    pub y_mm: f32,
    pub size_pt: f32,
    pub bold: bool,
}

fn chars_per_line(size_pt: f32, char_em: f32) -> usize {
    let width_pt = TEXT_WIDTH_MM * PT_PER_MM;
    ((width_pt / (size_pt * char_em)).floor() as usize).max(1)
}

fn estimated_width_mm(text: &str, size_pt: f32, char_em: f32) -> f32 {
    text.chars().count() as f32 * size_pt * char_em / PT_PER_MM
}

/// Greedy word wrap. Explicit newlines are kept and over-long words are split.
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                lines.push(word.drain(..max_chars).collect());
            }
            let word: String = word.into_iter().collect();
            if word.is_empty() {
                continue;
            }
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        }
        lines.push(current);
    }
    lines
}

/// Places the centered bold title and the left-aligned body, breaking pages as needed.
pub fn layout(title: &str, summary: &str) -> Vec<Vec<PlacedLine>> {
    let mut pages = vec![Vec::new()];
    let top = PAGE_HEIGHT_MM - MARGIN_MM;
    let mut cursor = top;

    let place = |pages: &mut Vec<Vec<PlacedLine>>, cursor: &mut f32, line: PlacedLine, height: f32| {
        if *cursor - height < BOTTOM_MARGIN_MM {
            pages.push(Vec::new());
            *cursor = top;
        }
        let baseline = *cursor - height * 0.7;
        if let Some(page) = pages.last_mut() {
            page.push(PlacedLine { y_mm: baseline, ..line });
        }
        *cursor -= height;
    };

    let clean_title = sanitize(&format!("Summary: {title}"));
    for text in wrap(&clean_title, chars_per_line(TITLE_SIZE_PT, BOLD_CHAR_EM)) {
        let width = estimated_width_mm(&text, TITLE_SIZE_PT, BOLD_CHAR_EM).min(TEXT_WIDTH_MM);
        let line = PlacedLine {
            x_mm: MARGIN_MM + (TEXT_WIDTH_MM - width) / 2.0,
            y_mm: 0.0,
            size_pt: TITLE_SIZE_PT,
            bold: true,
            text,
        };
        place(&mut pages, &mut cursor, line, TITLE_LINE_MM);
    }
    cursor -= TITLE_GAP_MM;

    let clean_body = sanitize(summary);
    for text in wrap(&clean_body, chars_per_line(BODY_SIZE_PT, REGULAR_CHAR_EM)) {
        let line = PlacedLine {
            x_mm: MARGIN_MM,
            y_mm: 0.0,
            size_pt: BODY_SIZE_PT,
            bold: false,
            text,
        };
        place(&mut pages, &mut cursor, line, BODY_LINE_MM);
    }
    pages
}

/// Renders the summary document and returns the encoded PDF.
pub fn render(title: &str, summary: &str) -> Result<Vec<u8>> {
    let mut doc = PdfDocument::new(&sanitize(&format!("Summary: {title}")));
    let layer_id = doc.add_layer(&Layer::new("Summary"));

    for lines in layout(title, summary) {
        let mut ops = vec![Op::BeginLayer {
            layer_id: layer_id.clone(),
        }];
        for line in lines.into_iter().filter(|l| !l.text.is_empty()) {
            let font = if line.bold {
                BuiltinFont::HelveticaBold
            } else {
                BuiltinFont::Helvetica
            };
            ops.extend([
                Op::StartTextSection,
                Op::SetFontSizeBuiltinFont {
                    size: Pt(line.size_pt),
                    font,
                },
                Op::SetTextMatrix {
                    matrix: TextMatrix::Translate(Mm(line.x_mm).into(), Mm(line.y_mm).into()),
                },
                Op::SetTextRenderingMode {
                    mode: TextRenderingMode::Fill,
                },
                Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(line.text)],
                    font,
                },
                Op::EndTextSection,
            ]);
        }
        ops.push(Op::EndLayer {
            layer_id: layer_id.clone(),
        });
        doc.pages
            .push(PdfPage::new(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), ops));
    }

    let mut warnings = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    encode_shown_text(&bytes)
}

/// Built-in fonts are declared with WinAnsiEncoding, but printpdf writes their strings as
/// UTF-8. Rewrites every `Tj`/`TJ` string to one byte per character.
fn encode_shown_text(pdf: &[u8]) -> Result<Vec<u8>> {
    let mut doc = Document::load_mem(pdf)?;
    for page_id in doc.get_pages().into_values() {
        let mut content = Content::decode(&doc.get_page_content(page_id)?)?;
        for operation in content
            .operations
            .iter_mut()
            .filter(|op| op.operator == "Tj" || op.operator == "TJ")
        {
            operation.operands.iter_mut().for_each(to_single_byte);
        }
        doc.change_page_content(page_id, content.encode()?)?;
    }

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

fn to_single_byte(operand: &mut Object) {
    match operand {
        Object::String(bytes, _) => {
            if let Ok(text) = std::str::from_utf8(bytes) {
                let encoded: Vec<u8> = text.chars().map(win_ansi_byte).collect();
                *bytes = encoded;
            }
        }
        Object::Array(items) => items.iter_mut().for_each(to_single_byte),
        _ => {}
    }
}

// WinAnsiEncoding agrees with Latin-1 except in 0x80..=0x9F.
fn win_ansi_byte(c: char) -> u8 {
    match u8::try_from(u32::from(c)) {
        Ok(b) if !(0x80..=0x9F).contains(&b) => b,
        _ => b'?',
    }
}
