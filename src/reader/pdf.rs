//! PDF document backed by the `pdf` crate
//!
//! Page text is extracted once at parse time. Rendering lays that text onto
//! a character surface sized from the page's media box at the render scale.

use std::collections::HashMap;
use std::sync::Arc;

use pdf::content::{Op, TextDrawAdjusted};
use pdf::error::PdfError;
use pdf::file::FileOptions;
use pdf::font::ToUnicodeMap;
use pdf::object::{Resolve, Resources};
use pdf::primitive::{Name, PdfString};
use tracing::debug;

use super::error::ReaderError;
use super::render::{PdfDocument, PdfEngine, RenderParams, RenderedPage};

/// Fallback page width (US Letter) when a page has no usable media box
const LETTER_WIDTH_PT: f32 = 612.0;

/// Device pixels one terminal cell stands for
const CELL_WIDTH_PX: f32 = 8.0;

/// Kerning (thousandths of an em) wide enough to read as a word gap
const WORD_GAP: f32 = -200.0;

/// Engine producing [`TextPdf`] documents
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextEngine;

impl PdfEngine for PdfTextEngine {
    fn parse(&self, bytes: Vec<u8>) -> Result<Arc<dyn PdfDocument>, ReaderError> {
        let file = FileOptions::cached().load(bytes).map_err(pdf_error)?;
        let resolver = file.resolver();
        let count = file.num_pages();
        let mut pages = Vec::with_capacity(count as usize);

        for index in 0..count {
            let page = file.get_page(index).map_err(pdf_error)?;
            let width_pt = page
                .media_box()
                .map(|r| (r.right - r.left).abs())
                .ok()
                .filter(|w| *w > 0.0)
                .unwrap_or(LETTER_WIDTH_PT);

            let text = match &page.contents {
                Some(content) => {
                    let ops = content.operations(&resolver).map_err(pdf_error)?;
                    let resources = page.resources().ok().map(|r| &**r);
                    ops_to_text(&ops, &resolver, resources)
                }
                None => String::new(),
            };
            pages.push(PageText { width_pt, text });
        }

        debug!("Parsed PDF with {} pages", pages.len());
        Ok(Arc::new(TextPdf { pages }))
    }
}

fn pdf_error(e: PdfError) -> ReaderError {
    ReaderError::Pdf(e.to_string())
}

/// Extracted text of one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    pub width_pt: f32,
    pub text: String,
}

/// A PDF reduced to per-page text
#[derive(Debug, Clone, Default)]
pub struct TextPdf {
    pages: Vec<PageText>,
}

impl TextPdf {
    pub fn new(pages: Vec<PageText>) -> Self {
        Self { pages }
    }
}

impl PdfDocument for TextPdf {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn render_page(
        &self,
        number: usize,
        params: RenderParams,
    ) -> Result<RenderedPage, ReaderError> {
        let count = self.pages.len();
        let page = number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .ok_or(ReaderError::PageOutOfRange { page: number, count })?;

        let columns = ((page.width_pt * params.scale) / CELL_WIDTH_PX).round() as u16;
        let width = columns.min(params.max_width).max(1);

        Ok(RenderedPage { number, width, lines: layout_text(&page.text, width as usize) })
    }
}

/// Wrap extracted text, collapsing runs of blank lines
fn layout_text(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        let raw = raw.trim_end();
        if raw.trim().is_empty() {
            if lines.last().is_some_and(|l| !l.is_empty()) {
                lines.push(String::new());
            }
            continue;
        }
        lines.extend(textwrap::wrap(raw, width).into_iter().map(|l| l.into_owned()));
    }
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

fn ops_to_text(ops: &[Op], resolver: &impl Resolve, resources: Option<&Resources>) -> String {
    let mut maps: HashMap<Name, Option<ToUnicodeMap>> = HashMap::new();
    let mut font: Option<Name> = None;
    let mut out = String::new();

    for op in ops {
        match op {
            Op::TextFont { name, .. } => font = Some(name.clone()),
            Op::TextDraw { text } => {
                out.push_str(&decode(text, font.as_ref(), resolver, resources, &mut maps));
            }
            Op::TextDrawAdjusted { array } => {
                for item in array {
                    match item {
                        TextDrawAdjusted::Text(text) => {
                            out.push_str(&decode(text, font.as_ref(), resolver, resources, &mut maps));
                        }
                        TextDrawAdjusted::Spacing(gap) if *gap < WORD_GAP => push_space(&mut out),
                        _ => {}
                    }
                }
            }
            Op::TextNewline => out.push('\n'),
            Op::MoveTextPosition { translation } => {
                if translation.y != 0.0 {
                    out.push('\n');
                } else {
                    push_space(&mut out);
                }
            }
            _ => {}
        }
    }

    sanitize(&out)
}

fn push_space(out: &mut String) {
    if !out.is_empty() && !out.ends_with([' ', '\n']) {
        out.push(' ');
    }
}

fn decode(
    text: &PdfString,
    font: Option<&Name>,
    resolver: &impl Resolve,
    resources: Option<&Resources>,
    maps: &mut HashMap<Name, Option<ToUnicodeMap>>,
) -> String {
    let (Some(font), Some(resources)) = (font, resources) else {
        return text.to_string_lossy();
    };
    match to_unicode(font, resources, resolver, maps) {
        Some(map) => decode_with_map(text.as_bytes(), map).unwrap_or_else(|| text.to_string_lossy()),
        None => text.to_string_lossy(),
    }
}

fn to_unicode<'m>(
    font: &Name,
    resources: &Resources,
    resolver: &impl Resolve,
    maps: &'m mut HashMap<Name, Option<ToUnicodeMap>>,
) -> Option<&'m ToUnicodeMap> {
    if !maps.contains_key(font) {
        let map = resources
            .fonts
            .get(font)
            .and_then(|lazy| lazy.load(resolver).ok())
            .and_then(|f| f.to_unicode(resolver))
            .and_then(Result::ok);
        maps.insert(font.clone(), map);
    }
    maps.get(font).and_then(Option::as_ref)
}

/// Decode with whichever code width (1 or 2 bytes) the map recognises more of
fn decode_with_map(bytes: &[u8], map: &ToUnicodeMap) -> Option<String> {
    let single = decode_codes(bytes.iter().map(|&b| u16::from(b)), map);
    let double = (bytes.len() % 2 == 0).then(|| {
        decode_codes(bytes.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])), map)
    });

    let (text, hits, total) = match double {
        Some(d) if d.1 > single.1 => d,
        _ => single,
    };
    (total > 0 && hits * 2 >= total).then_some(text)
}

fn decode_codes(codes: impl Iterator<Item = u16>, map: &ToUnicodeMap) -> (String, usize, usize) {
    let mut out = String::new();
    let mut hits = 0;
    let mut total = 0;
    for code in codes {
        total += 1;
        if let Some(s) = map.get(code) {
            out.push_str(s);
            hits += 1;
        }
    }
    (out, hits, total)
}

/// Drop control and private-use characters the extractor leaks
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c == '\r' { '\n' } else { c })
        .filter(|&c| {
            let code = c as u32;
            c == '\n'
                || c == '\t'
                || !(c.is_control()
                    || c == '\u{FFFD}'
                    || (0xE000..=0xF8FF).contains(&code)
                    || (0xF0000..=0x10FFFD).contains(&code))
        })
        .collect()
}
