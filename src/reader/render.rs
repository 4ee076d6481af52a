//! Contracts for the rendering engines
//!
//! The session only talks to renderers through these traits. Construction
//! and page rendering run off the UI thread, so everything here is `Send`.

use std::fmt;
use std::sync::Arc;

use super::epub::EpubTextEngine;
use super::error::ReaderError;
use super::pdf::PdfTextEngine;
use super::session::RelocationSink;

/// Scale factor applied when laying out PDF pages
pub const PDF_RENDER_SCALE: f32 = 1.5;

/// Rendition settings for an EPUB surface.
///
/// Chapters always start on a fresh page, and two pages are shown side by
/// side once the surface is at least `SPREAD_MIN_WIDTH` columns wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenditionConfig {
    pub width: u16,
    pub height: u16,
}

impl RenditionConfig {
    /// Paginated, auto-spread rendition of the given size
    pub fn paginated(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Opaque position token handed out by an EPUB rendition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location(pub String);

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position report emitted by a rendition after it moves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub location: Location,
    /// 1-based page of the first visible page
    pub page: usize,
    pub total: usize,
    pub at_start: bool,
    pub at_end: bool,
}

/// A live EPUB view bound to one surface
pub trait EpubRendition: Send {
    /// Show the page holding `target`, or the first page
    fn display(&mut self, target: Option<&Location>) -> Result<(), ReaderError>;

    /// Advance one view; no-op at the end
    fn next(&mut self);

    /// Go back one view; no-op at the start
    fn prev(&mut self);

    /// Re-lay out for a new surface size, staying near the current position
    fn resize(&mut self, width: u16, height: u16);

    /// Lines of each page currently visible, left to right
    fn view(&self) -> Vec<Vec<String>>;
}

/// Builds EPUB renditions from raw bytes
pub trait EpubEngine: Send + Sync {
    fn open(
        &self,
        bytes: Vec<u8>,
        config: RenditionConfig,
        relocations: RelocationSink,
    ) -> Result<Box<dyn EpubRendition>, ReaderError>;
}

/// Scale and surface limit for rendering a PDF page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    pub scale: f32,
    /// Widest line the surface can show, in cells
    pub max_width: u16,
}

impl RenderParams {
    /// Fixed-scale parameters for a surface `max_width` cells wide
    pub fn for_width(max_width: u16) -> Self {
        Self { scale: PDF_RENDER_SCALE, max_width }
    }
}

/// One PDF page laid out onto a character surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// 1-based page number
    pub number: usize,
    pub width: u16,
    pub lines: Vec<String>,
}

/// A parsed PDF document
pub trait PdfDocument: Send + Sync {
    fn page_count(&self) -> usize;

    /// Render page `number` (1-based)
    fn render_page(&self, number: usize, params: RenderParams)
    -> Result<RenderedPage, ReaderError>;
}

/// Parses PDF documents from raw bytes
pub trait PdfEngine: Send + Sync {
    fn parse(&self, bytes: Vec<u8>) -> Result<Arc<dyn PdfDocument>, ReaderError>;
}

/// The pair of engines a session drives
#[derive(Clone)]
pub struct Renderers {
    pub epub: Arc<dyn EpubEngine>,
    pub pdf: Arc<dyn PdfEngine>,
}

impl Renderers {
    /// Text engines backed by the `epub` and `pdf` crates
    pub fn native() -> Self {
        Self { epub: Arc::new(EpubTextEngine), pdf: Arc::new(PdfTextEngine) }
    }
}

impl fmt::Debug for Renderers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderers").finish_non_exhaustive()
    }
}
