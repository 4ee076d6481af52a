//! EPUB rendition backed by the `epub` crate
//!
//! Spine documents are flattened to plain paragraphs, wrapped to the surface
//! width and cut into pages of the surface height.

use std::io::Cursor;

use epub::doc::EpubDoc;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use super::error::ReaderError;
use super::render::{EpubEngine, EpubRendition, Location, Relocation, RenditionConfig};
use super::session::RelocationSink;

/// Minimum surface width before an auto spread shows two pages
pub const SPREAD_MIN_WIDTH: u16 = 100;

/// Columns between the two pages of a spread
pub const SPREAD_GUTTER: u16 = 4;

/// Narrowest column we will wrap text into
const MIN_COLUMN_WIDTH: usize = 10;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static NUMERIC_ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#([xX]?)([0-9a-fA-F]+);").unwrap());

/// Engine producing [`TextRendition`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct EpubTextEngine;

impl EpubEngine for EpubTextEngine {
    fn open(
        &self,
        bytes: Vec<u8>,
        config: RenditionConfig,
        relocations: RelocationSink,
    ) -> Result<Box<dyn EpubRendition>, ReaderError> {
        let chapters = extract_chapters(bytes)?;
        if chapters.iter().all(Vec::is_empty) {
            return Err(ReaderError::EmptyDocument);
        }
        Ok(Box::new(TextRendition::new(chapters, config, relocations)))
    }
}

/// Read every spine document as a list of paragraphs
fn extract_chapters(bytes: Vec<u8>) -> Result<Vec<Vec<String>>, ReaderError> {
    let mut doc =
        EpubDoc::from_reader(Cursor::new(bytes)).map_err(|e| ReaderError::Epub(e.to_string()))?;

    let spine: Vec<String> = doc.spine.iter().map(|s| s.idref.clone()).collect();
    let mut chapters = Vec::with_capacity(spine.len());

    for id in spine {
        let Some((content, _mime)) = doc.get_resource(&id) else {
            debug!("Spine item {} has no resource", id);
            continue;
        };
        let xhtml = String::from_utf8_lossy(&content).into_owned();
        let body = extract_body(&xhtml).unwrap_or(xhtml.as_str());
        chapters.push(xhtml_to_paragraphs(body));
    }

    Ok(chapters)
}

/// Content between the body tags
fn extract_body(xhtml: &str) -> Option<&str> {
    let open = xhtml.find("<body")?;
    let start = open + xhtml[open..].find('>')? + 1;
    let end = xhtml.rfind("</body>")?;
    (start <= end).then(|| &xhtml[start..end])
}

/// Flatten XHTML into paragraphs of plain text
fn xhtml_to_paragraphs(xhtml: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut tag = String::new();
    let mut in_tag = false;
    let mut skip_depth = 0usize;

    for c in xhtml.chars() {
        match c {
            '<' => {
                in_tag = true;
                tag.clear();
            }
            '>' if in_tag => {
                in_tag = false;
                process_tag(&tag, &mut current, &mut paragraphs, &mut skip_depth);
            }
            _ if in_tag => tag.push(c),
            _ if skip_depth == 0 => current.push(c),
            _ => {}
        }
    }

    flush_paragraph(&mut current, &mut paragraphs);
    paragraphs
}

fn process_tag(
    tag: &str,
    current: &mut String,
    paragraphs: &mut Vec<String>,
    skip_depth: &mut usize,
) {
    let lower = tag.trim().to_ascii_lowercase();
    let is_closing = lower.starts_with('/');
    let self_closing = lower.ends_with('/');
    let name = lower
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or("");

    match name {
        "script" | "style" | "head" => {
            if is_closing {
                *skip_depth = skip_depth.saturating_sub(1);
            } else if !self_closing {
                *skip_depth += 1;
            }
        }
        "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote" | "pre" | "tr"
        | "section" | "ul" | "ol" | "table" | "br" => flush_paragraph(current, paragraphs),
        "li" => {
            flush_paragraph(current, paragraphs);
            if !is_closing {
                current.push_str("• ");
            }
        }
        "hr" if !is_closing => {
            flush_paragraph(current, paragraphs);
            paragraphs.push("* * *".to_string());
        }
        _ => {}
    }
}

fn flush_paragraph(current: &mut String, paragraphs: &mut Vec<String>) {
    let decoded = decode_entities(current);
    let text = WHITESPACE_RE.replace_all(&decoded, " ");
    let text = text.trim();
    if !text.is_empty() && text != "•" {
        paragraphs.push(text.to_string());
    }
    current.clear();
}

fn decode_entities(text: &str) -> String {
    let numeric = NUMERIC_ENTITY_RE.replace_all(text, |caps: &Captures| {
        let radix = if caps[1].is_empty() { 10 } else { 16 };
        u32::from_str_radix(&caps[2], radix)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    numeric
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Page {
    chapter: usize,
    first_line: usize,
    lines: Vec<String>,
}

#[derive(Debug)]
struct Layout {
    pages: Vec<Page>,
    chapter_lines: Vec<usize>,
    per_view: usize,
}

fn layout(chapters: &[Vec<String>], config: &RenditionConfig) -> Layout {
    let per_view = if config.width >= SPREAD_MIN_WIDTH { 2 } else { 1 };
    let column = if per_view == 2 {
        config.width.saturating_sub(SPREAD_GUTTER) / 2
    } else {
        config.width
    };
    let column = (column as usize).max(MIN_COLUMN_WIDTH);
    let height = (config.height as usize).max(1);

    let mut pages: Vec<Page> = Vec::new();
    let mut chapter_lines = Vec::with_capacity(chapters.len());

    for (chapter, paragraphs) in chapters.iter().enumerate() {
        let lines = wrap_paragraphs(paragraphs, column);
        chapter_lines.push(lines.len());

        for (i, chunk) in lines.chunks(height).enumerate() {
            pages.push(Page { chapter, first_line: i * height, lines: chunk.to_vec() });
        }
    }

    Layout { pages, chapter_lines, per_view }
}

fn wrap_paragraphs(paragraphs: &[String], width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, paragraph) in paragraphs.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.extend(textwrap::wrap(paragraph, width).into_iter().map(|l| l.into_owned()));
    }
    lines
}

/// Paginated plain-text view of an EPUB
pub struct TextRendition {
    chapters: Vec<Vec<String>>,
    config: RenditionConfig,
    layout: Layout,
    /// Index of the first visible page
    current: usize,
    relocations: RelocationSink,
}

impl TextRendition {
    pub fn new(
        chapters: Vec<Vec<String>>,
        config: RenditionConfig,
        relocations: RelocationSink,
    ) -> Self {
        let layout = layout(&chapters, &config);
        Self { chapters, config, layout, current: 0, relocations }
    }

    fn total(&self) -> usize {
        self.layout.pages.len()
    }

    fn align(&self, index: usize) -> usize {
        index - index % self.layout.per_view
    }

    fn relocation(&self) -> Option<Relocation> {
        let page = self.layout.pages.get(self.current)?;
        Some(Relocation {
            location: Location(format!("{}:{}", page.chapter, page.first_line)),
            page: self.current + 1,
            total: self.total(),
            at_start: self.current == 0,
            at_end: self.current + self.layout.per_view >= self.total(),
        })
    }

    fn emit(&self) {
        if let Some(relocation) = self.relocation() {
            self.relocations.emit(relocation);
        }
    }

    /// Last page starting at or before `(chapter, line)`
    fn page_at(&self, chapter: usize, line: usize) -> usize {
        self.layout
            .pages
            .iter()
            .rposition(|p| (p.chapter, p.first_line) <= (chapter, line))
            .unwrap_or(0)
    }

    fn parse_location(location: &Location) -> Option<(usize, usize)> {
        let (chapter, line) = location.0.split_once(':')?;
        Some((chapter.parse().ok()?, line.parse().ok()?))
    }
}

impl EpubRendition for TextRendition {
    fn display(&mut self, target: Option<&Location>) -> Result<(), ReaderError> {
        if self.layout.pages.is_empty() {
            return Err(ReaderError::EmptyDocument);
        }
        let index = target
            .and_then(Self::parse_location)
            .map(|(chapter, line)| self.page_at(chapter, line))
            .unwrap_or(0);
        self.current = self.align(index);
        self.emit();
        Ok(())
    }

    fn next(&mut self) {
        if self.current + self.layout.per_view < self.total() {
            self.current += self.layout.per_view;
            self.emit();
        }
    }

    fn prev(&mut self) {
        if self.current > 0 {
            self.current = self.current.saturating_sub(self.layout.per_view);
            self.emit();
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        if self.config.width == width && self.config.height == height {
            return;
        }

        // Remember how far into the chapter we were
        let anchor = self.layout.pages.get(self.current).map(|p| {
            let lines = self.layout.chapter_lines.get(p.chapter).copied().unwrap_or(1).max(1);
            (p.chapter, p.first_line as f64 / lines as f64)
        });

        self.config.width = width;
        self.config.height = height;
        self.layout = layout(&self.chapters, &self.config);

        let index = anchor
            .map(|(chapter, ratio)| {
                let lines = self.layout.chapter_lines.get(chapter).copied().unwrap_or(0);
                self.page_at(chapter, (ratio * lines as f64) as usize)
            })
            .unwrap_or(0);
        self.current = self.align(index);
        debug!("EPUB relaid out to {}x{}, {} pages", width, height, self.total());
        self.emit();
    }

    fn view(&self) -> Vec<Vec<String>> {
        let end = (self.current + self.layout.per_view).min(self.total());
        self.layout
            .pages
            .get(self.current..end)
            .unwrap_or_default()
            .iter()
            .map(|p| p.lines.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::session::ReaderEvent;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;

    fn chapters(paragraphs_per_chapter: &[usize]) -> Vec<Vec<String>> {
        paragraphs_per_chapter
            .iter()
            .enumerate()
            .map(|(c, &n)| (0..n).map(|p| format!("c{c}p{p}")).collect())
            .collect()
    }

    fn rendition(
        chapters: Vec<Vec<String>>,
        width: u16,
        height: u16,
    ) -> (TextRendition, mpsc::UnboundedReceiver<ReaderEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = RelocationSink::new(1, tx);
        (TextRendition::new(chapters, RenditionConfig::paginated(width, height), sink), rx)
    }

    fn last_relocation(rx: &mut mpsc::UnboundedReceiver<ReaderEvent>) -> Option<Relocation> {
        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            if let ReaderEvent::Relocated { relocation, .. } = event {
                last = Some(relocation);
            }
        }
        last
    }

    #[test]
    fn paragraphs_from_block_tags() {
        let xhtml = "<h1>Title</h1><p>First <em>para</em>.</p><p>Second</p>";
        assert_eq!(xhtml_to_paragraphs(xhtml), vec!["Title", "First para.", "Second"]);
    }

    #[test]
    fn script_and_style_are_skipped() {
        let xhtml = "<style>p { color: red }</style><p>Shown</p><script>alert(1)</script>";
        assert_eq!(xhtml_to_paragraphs(xhtml), vec!["Shown"]);
    }

    #[test]
    fn list_items_get_bullets() {
        let xhtml = "<ul><li>One</li><li>Two</li><li></li></ul>";
        assert_eq!(xhtml_to_paragraphs(xhtml), vec!["• One", "• Two"]);
    }

    #[test]
    fn whitespace_collapses_and_entities_decode() {
        let xhtml = "<p>Fish\n   &amp;   chips &#233;&#x41;&nbsp;&lt;x&gt;</p>";
        assert_eq!(xhtml_to_paragraphs(xhtml), vec!["Fish & chips éA <x>"]);
    }

    #[test]
    fn body_is_extracted() {
        let xhtml = "<html><head><title>T</title></head><body class=\"x\"><p>Hi</p></body></html>";
        assert_eq!(extract_body(xhtml), Some("<p>Hi</p>"));
    }

    #[test]
    fn chapters_start_on_fresh_pages() {
        // 3 paragraphs -> 5 lines; height 2 -> 3 pages. 1 paragraph -> 1 page.
        let layout = layout(&chapters(&[3, 1]), &RenditionConfig::paginated(40, 2));
        assert_eq!(layout.pages.len(), 4);
        assert_eq!(layout.pages[3].chapter, 1);
        assert_eq!(layout.pages[3].first_line, 0);
        assert_eq!(layout.per_view, 1);
    }

    #[test]
    fn wide_surface_uses_spread() {
        let layout = layout(&chapters(&[1]), &RenditionConfig::paginated(120, 10));
        assert_eq!(layout.per_view, 2);
        let narrow = RenditionConfig::paginated(SPREAD_MIN_WIDTH - 1, 10);
        assert_eq!(super::layout(&chapters(&[1]), &narrow).per_view, 1);
    }

    #[test]
    fn display_emits_first_relocation() {
        let (mut r, mut rx) = rendition(chapters(&[3, 1]), 40, 2);
        r.display(None).unwrap();
        let rel = last_relocation(&mut rx).unwrap();
        assert_eq!(rel.page, 1);
        assert_eq!(rel.total, 4);
        assert!(rel.at_start);
        assert!(!rel.at_end);
        assert_eq!(rel.location, Location("0:0".into()));
    }

    #[test]
    fn next_and_prev_stop_at_edges() {
        let (mut r, mut rx) = rendition(chapters(&[1, 1]), 40, 5);
        r.display(None).unwrap();
        r.prev();
        assert_eq!(last_relocation(&mut rx).unwrap().page, 1);

        r.next();
        let rel = last_relocation(&mut rx).unwrap();
        assert_eq!(rel.page, 2);
        assert!(rel.at_end);

        r.next();
        assert!(last_relocation(&mut rx).is_none());
    }

    #[test]
    fn display_restores_location() {
        let (mut r, mut rx) = rendition(chapters(&[3, 1]), 40, 2);
        r.display(Some(&Location("1:0".into()))).unwrap();
        assert_eq!(last_relocation(&mut rx).unwrap().page, 4);
    }

    #[test]
    fn resize_stays_in_chapter() {
        let (mut r, mut rx) = rendition(chapters(&[3, 4]), 40, 2);
        r.display(Some(&Location("1:0".into()))).unwrap();
        r.resize(40, 100);
        let rel = last_relocation(&mut rx).unwrap();
        assert_eq!(rel.total, 2);
        assert_eq!(rel.location, Location("1:0".into()));
    }

    #[test]
    fn view_shows_spread_pages() {
        let (mut r, _rx) = rendition(chapters(&[1, 1, 1]), 120, 5);
        r.display(None).unwrap();
        assert_eq!(r.view().len(), 2);
        r.next();
        assert_eq!(r.view().len(), 1);
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let result = EpubTextEngine.open(
            b"not a zip".to_vec(),
            RenditionConfig::paginated(80, 24),
            RelocationSink::new(1, tx),
        );
        assert!(matches!(result, Err(ReaderError::Epub(_))));
    }

    const CONTAINER: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

    /// Zip up a minimal EPUB with one spine document per entry of `chapters`
    fn sample_epub(chapters: &[&str]) -> Vec<u8> {
        use std::io::Write;
        use zip::write::SimpleFileOptions;
        use zip::{CompressionMethod, ZipWriter};

        let mut manifest = String::new();
        let mut spine = String::new();
        for i in 1..=chapters.len() {
            manifest.push_str(&format!(
                r#"<item id="ch{i}" href="ch{i}.xhtml" media-type="application/xhtml+xml"/>"#
            ));
            spine.push_str(&format!(r#"<itemref idref="ch{i}"/>"#));
        }
        let opf = format!(
            r#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Dune</dc:title>
    <dc:identifier id="id">dune</dc:identifier>
  </metadata>
  <manifest>{manifest}</manifest>
  <spine>{spine}</spine>
</package>"#
        );

        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("mimetype", stored).unwrap();
        zip.write_all(b"application/epub+zip").unwrap();
        zip.start_file("META-INF/container.xml", stored).unwrap();
        zip.write_all(CONTAINER.as_bytes()).unwrap();
        zip.start_file("OEBPS/content.opf", stored).unwrap();
        zip.write_all(opf.as_bytes()).unwrap();
        for (i, text) in chapters.iter().enumerate() {
            let n = i + 1;
            let xhtml = format!(
                "<html><head><title>Ch {n}</title><style>p {{ margin: 0 }}</style></head>\
                 <body><h1>Chapter {n}</h1><p>{text}</p></body></html>"
            );
            zip.start_file(format!("OEBPS/ch{n}.xhtml"), stored).unwrap();
            zip.write_all(xhtml.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn spine_documents_become_chapters() {
        let bytes = sample_epub(&["Arrakis is a desert planet.", "The spice must flow."]);
        assert_eq!(
            extract_chapters(bytes).unwrap(),
            vec![
                vec!["Chapter 1".to_string(), "Arrakis is a desert planet.".to_string()],
                vec!["Chapter 2".to_string(), "The spice must flow.".to_string()],
            ]
        );
    }

    #[test]
    fn real_epub_opens_on_its_first_page() {
        let bytes = sample_epub(&["Arrakis is a desert planet.", "The spice must flow."]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut rendition = EpubTextEngine
            .open(bytes, RenditionConfig::paginated(60, 10), RelocationSink::new(1, tx))
            .unwrap();

        rendition.display(None).unwrap();
        let rel = last_relocation(&mut rx).unwrap();
        assert_eq!((rel.page, rel.total), (1, 2));
        assert_eq!(
            rendition.view(),
            vec![vec![
                "Chapter 1".to_string(),
                String::new(),
                "Arrakis is a desert planet.".to_string(),
            ]]
        );

        rendition.next();
        assert!(last_relocation(&mut rx).unwrap().at_end);
    }
}
