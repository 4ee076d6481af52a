//! Reading session lifecycle
//!
//! A session owns at most one live renderer. Renderer work runs on blocking
//! tasks and reports back over a channel the session alone consumes. Each
//! open bumps a generation counter and every event carries the generation it
//! was produced for, so completions from a torn-down renderer are dropped.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use super::error::ReaderError;
use super::render::{
    EpubRendition, PdfDocument, Relocation, RenderParams, RenderedPage, Renderers,
    RenditionConfig,
};
use crate::library::{BookRecord, MediaType};

/// Completion delivered by renderer work
pub enum ReaderEvent {
    EpubReady { generation: u64, rendition: Box<dyn EpubRendition> },
    PdfReady { generation: u64, document: Arc<dyn PdfDocument> },
    PageRendered { generation: u64, page: usize, result: Result<RenderedPage, ReaderError> },
    Relocated { generation: u64, relocation: Relocation },
    Failed { generation: u64, error: ReaderError },
}

impl ReaderEvent {
    fn generation(&self) -> u64 {
        match self {
            Self::EpubReady { generation, .. }
            | Self::PdfReady { generation, .. }
            | Self::PageRendered { generation, .. }
            | Self::Relocated { generation, .. }
            | Self::Failed { generation, .. } => *generation,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::EpubReady { .. } => "EpubReady",
            Self::PdfReady { .. } => "PdfReady",
            Self::PageRendered { .. } => "PageRendered",
            Self::Relocated { .. } => "Relocated",
            Self::Failed { .. } => "Failed",
        }
    }
}

impl fmt::Debug for ReaderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.name()).field("generation", &self.generation()).finish()
    }
}

/// Handle a rendition uses to report where it moved
#[derive(Debug, Clone)]
pub struct RelocationSink {
    generation: u64,
    tx: UnboundedSender<ReaderEvent>,
}

impl RelocationSink {
    pub fn new(generation: u64, tx: UnboundedSender<ReaderEvent>) -> Self {
        Self { generation, tx }
    }

    pub fn emit(&self, relocation: Relocation) {
        // Receiver only goes away with the session itself
        let _ = self.tx.send(ReaderEvent::Relocated { generation: self.generation, relocation });
    }
}

/// Which renderer drives the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActiveFormat {
    #[default]
    None,
    Epub,
    Pdf,
}

/// Current position, in the active renderer's terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    /// As last reported by the rendition
    Epub(Relocation),
    /// 1-based page
    Pdf { page: usize, page_count: usize },
}

/// What changed after handling renderer events
#[derive(Debug)]
pub enum SessionUpdate {
    /// First page is ready
    Opened { title: String },
    /// Position or visible content changed
    Moved,
    /// Something went wrong; the session is Closed unless an open PDF page failed
    Failed(ReaderError),
}

/// Size of the display surface in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 80, height: 24 }
    }
}

/// What the display surface should show
#[derive(Debug)]
pub enum Surface<'a> {
    Hidden,
    Loading { format: ActiveFormat },
    /// Visible pages, left to right
    Epub(Vec<Vec<String>>),
    /// Latest rendered page; may trail `page` while a render is in flight
    Pdf { page: usize, rendered: Option<&'a RenderedPage> },
}

enum State {
    Closed,
    OpeningEpub {
        title: String,
        /// Surface size the rendition was built for
        laid_out: Viewport,
        rendition: Option<Box<dyn EpubRendition>>,
    },
    OpeningPdf {
        title: String,
        document: Option<Arc<dyn PdfDocument>>,
    },
    OpenEpub {
        title: String,
        rendition: Box<dyn EpubRendition>,
        position: Relocation,
    },
    OpenPdf {
        title: String,
        document: Arc<dyn PdfDocument>,
        page: usize,
        rendered: Option<RenderedPage>,
    },
}

/// The single reading session of the app
pub struct ReaderSession {
    renderers: Renderers,
    state: State,
    generation: u64,
    viewport: Viewport,
    tx: UnboundedSender<ReaderEvent>,
    rx: UnboundedReceiver<ReaderEvent>,
}

impl ReaderSession {
    pub fn new(renderers: Renderers) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { renderers, state: State::Closed, generation: 0, viewport: Viewport::default(), tx, rx }
    }

    /// Open `record`, closing whatever was open before.
    ///
    /// Fails without leaving Closed when the media type has no renderer or the
    /// payload cannot be decoded. Renderer failures arrive later as
    /// [`SessionUpdate::Failed`].
    pub fn open(&mut self, record: &BookRecord, viewport: Viewport) -> Result<(), ReaderError> {
        self.close();
        self.viewport = viewport;

        let format = match record.media_type {
            MediaType::Epub => ActiveFormat::Epub,
            MediaType::Pdf => ActiveFormat::Pdf,
            MediaType::Unknown(_) => {
                return Err(ReaderError::UnsupportedFormat(record.media_type.clone()));
            }
        };
        let bytes = record.decode_payload()?;

        let generation = self.generation;
        let tx = self.tx.clone();
        let title = record.title.clone();
        debug!("Opening {:?} as {:?} (generation {})", title, format, generation);

        match format {
            ActiveFormat::Epub => {
                let engine = Arc::clone(&self.renderers.epub);
                let config = RenditionConfig::paginated(viewport.width, viewport.height);
                let sink = RelocationSink::new(generation, tx.clone());
                tokio::task::spawn_blocking(move || {
                    let event = match guarded(|| engine.open(bytes, config, sink)) {
                        Ok(rendition) => ReaderEvent::EpubReady { generation, rendition },
                        Err(error) => ReaderEvent::Failed { generation, error },
                    };
                    let _ = tx.send(event);
                });
                self.state = State::OpeningEpub { title, laid_out: viewport, rendition: None };
            }
            ActiveFormat::Pdf => {
                let engine = Arc::clone(&self.renderers.pdf);
                tokio::task::spawn_blocking(move || {
                    let event = match guarded(|| engine.parse(bytes)) {
                        Ok(document) => ReaderEvent::PdfReady { generation, document },
                        Err(error) => ReaderEvent::Failed { generation, error },
                    };
                    let _ = tx.send(event);
                });
                self.state = State::OpeningPdf { title, document: None };
            }
            ActiveFormat::None => {}
        }
        Ok(())
    }

    /// Tear down the renderer and clear the surface
    pub fn close(&mut self) {
        if !matches!(self.state, State::Closed) {
            debug!("Closing reader session (generation {})", self.generation);
        }
        self.generation += 1;
        self.state = State::Closed;
    }

    /// Advance one view; returns false when there is nowhere to go
    pub fn next(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        let (document, page) = match &mut self.state {
            State::OpenEpub { rendition, .. } => {
                rendition.next();
                return true;
            }
            State::OpenPdf { document, page, .. } => {
                *page += 1;
                (Arc::clone(document), *page)
            }
            _ => return false,
        };
        self.request_render(document, page);
        true
    }

    /// Go back one view; returns false when there is nowhere to go
    pub fn prev(&mut self) -> bool {
        if !self.can_prev() {
            return false;
        }
        let (document, page) = match &mut self.state {
            State::OpenEpub { rendition, .. } => {
                rendition.prev();
                return true;
            }
            State::OpenPdf { document, page, .. } => {
                *page -= 1;
                (Arc::clone(document), *page)
            }
            _ => return false,
        };
        self.request_render(document, page);
        true
    }

    /// Adapt the active renderer to a new surface size
    pub fn resize(&mut self, viewport: Viewport) {
        if self.viewport == viewport {
            return;
        }
        self.viewport = viewport;

        let rerender = match &mut self.state {
            State::OpeningEpub { rendition: Some(rendition), .. }
            | State::OpenEpub { rendition, .. } => {
                rendition.resize(viewport.width, viewport.height);
                None
            }
            State::OpenPdf { document, page, .. } => Some((Arc::clone(document), *page)),
            _ => None,
        };
        if let Some((document, page)) = rerender {
            self.request_render(document, page);
        }
    }

    /// Apply every pending renderer event without waiting
    pub fn poll_events(&mut self) -> Vec<SessionUpdate> {
        let mut updates = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            updates.extend(self.handle(event));
        }
        updates
    }

    /// Wait for the next event that changes the session
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        while let Some(event) = self.rx.recv().await {
            if let Some(update) = self.handle(event) {
                return Some(update);
            }
        }
        None
    }

    pub fn active_format(&self) -> ActiveFormat {
        match self.state {
            State::Closed => ActiveFormat::None,
            State::OpeningEpub { .. } | State::OpenEpub { .. } => ActiveFormat::Epub,
            State::OpeningPdf { .. } | State::OpenPdf { .. } => ActiveFormat::Pdf,
        }
    }

    /// Position once the first page is showing
    pub fn position(&self) -> Option<Position> {
        match &self.state {
            State::OpenEpub { position, .. } => Some(Position::Epub(position.clone())),
            State::OpenPdf { document, page, .. } => {
                Some(Position::Pdf { page: *page, page_count: document.page_count() })
            }
            _ => None,
        }
    }

    pub fn can_next(&self) -> bool {
        match self.position() {
            Some(Position::Epub(relocation)) => !relocation.at_end,
            Some(Position::Pdf { page, page_count }) => page < page_count,
            None => false,
        }
    }

    pub fn can_prev(&self) -> bool {
        match self.position() {
            Some(Position::Epub(relocation)) => !relocation.at_start,
            Some(Position::Pdf { page, .. }) => page > 1,
            None => false,
        }
    }

    /// "Page X of Y" for the open book
    pub fn page_indicator(&self) -> Option<String> {
        let (page, total) = match self.position()? {
            Position::Epub(relocation) => (relocation.page, relocation.total),
            Position::Pdf { page, page_count } => (page, page_count),
        };
        Some(format!("Page {page} of {total}"))
    }

    pub fn title(&self) -> Option<&str> {
        match &self.state {
            State::Closed => None,
            State::OpeningEpub { title, .. }
            | State::OpeningPdf { title, .. }
            | State::OpenEpub { title, .. }
            | State::OpenPdf { title, .. } => Some(title),
        }
    }

    pub fn is_opening(&self) -> bool {
        matches!(self.state, State::OpeningEpub { .. } | State::OpeningPdf { .. })
    }

    pub fn surface(&self) -> Surface<'_> {
        match &self.state {
            State::Closed => Surface::Hidden,
            State::OpeningEpub { .. } | State::OpeningPdf { .. } => {
                Surface::Loading { format: self.active_format() }
            }
            State::OpenEpub { rendition, .. } => Surface::Epub(rendition.view()),
            State::OpenPdf { page, rendered, .. } => {
                Surface::Pdf { page: *page, rendered: rendered.as_ref() }
            }
        }
    }

    fn handle(&mut self, event: ReaderEvent) -> Option<SessionUpdate> {
        if event.generation() != self.generation {
            debug!("Dropping stale {:?}", event);
            return None;
        }

        match (std::mem::replace(&mut self.state, State::Closed), event) {
            (
                State::OpeningEpub { title, laid_out, rendition: None },
                ReaderEvent::EpubReady { mut rendition, .. },
            ) => {
                // The surface may have been resized while the book was loading
                if laid_out != self.viewport {
                    rendition.resize(self.viewport.width, self.viewport.height);
                }
                match rendition.display(None) {
                    Ok(()) => {
                        self.state = State::OpeningEpub {
                            title,
                            laid_out: self.viewport,
                            rendition: Some(rendition),
                        };
                        None
                    }
                    Err(error) => Some(self.fail(error)),
                }
            }
            (
                State::OpeningEpub { title, rendition: Some(rendition), .. },
                ReaderEvent::Relocated { relocation, .. },
            ) => {
                info!("Opened {:?}", title);
                self.state =
                    State::OpenEpub { title: title.clone(), rendition, position: relocation };
                Some(SessionUpdate::Opened { title })
            }
            (State::OpenEpub { title, rendition, .. }, ReaderEvent::Relocated { relocation, .. }) => {
                self.state = State::OpenEpub { title, rendition, position: relocation };
                Some(SessionUpdate::Moved)
            }
            (State::OpeningPdf { title, document: None }, ReaderEvent::PdfReady { document, .. }) => {
                if document.page_count() == 0 {
                    return Some(self.fail(ReaderError::EmptyDocument));
                }
                self.request_render(Arc::clone(&document), 1);
                self.state = State::OpeningPdf { title, document: Some(document) };
                None
            }
            (
                State::OpeningPdf { title, document: Some(document) },
                ReaderEvent::PageRendered { page: 1, result, .. },
            ) => match result {
                Ok(rendered) => {
                    info!("Opened {:?} ({} pages)", title, document.page_count());
                    self.state = State::OpenPdf {
                        title: title.clone(),
                        document,
                        page: 1,
                        rendered: Some(rendered),
                    };
                    Some(SessionUpdate::Opened { title })
                }
                Err(error) => Some(self.fail(error)),
            },
            (
                State::OpenPdf { title, document, page, rendered },
                ReaderEvent::PageRendered { page: rendered_page, result, .. },
            ) => {
                if rendered_page != page {
                    debug!("Discarding render of page {} (now on {})", rendered_page, page);
                    self.state = State::OpenPdf { title, document, page, rendered };
                    return None;
                }
                match result {
                    Ok(fresh) => {
                        self.state = State::OpenPdf { title, document, page, rendered: Some(fresh) };
                        Some(SessionUpdate::Moved)
                    }
                    Err(error) => {
                        warn!("Failed to render page {}: {}", page, error);
                        self.state = State::OpenPdf { title, document, page, rendered };
                        Some(SessionUpdate::Failed(error))
                    }
                }
            }
            (_, ReaderEvent::Failed { error, .. }) => Some(self.fail(error)),
            (state, event) => {
                debug!("Ignoring unexpected {:?}", event);
                self.state = state;
                None
            }
        }
    }

    fn request_render(&self, document: Arc<dyn PdfDocument>, page: usize) {
        let generation = self.generation;
        let tx = self.tx.clone();
        let params = RenderParams::for_width(self.viewport.width);
        tokio::task::spawn_blocking(move || {
            let result = guarded(|| document.render_page(page, params));
            let _ = tx.send(ReaderEvent::PageRendered { generation, page, result });
        });
    }

    fn fail(&mut self, error: ReaderError) -> SessionUpdate {
        warn!("Reader session failed: {}", error);
        self.close();
        SessionUpdate::Failed(error)
    }
}

impl fmt::Debug for ReaderSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderSession")
            .field("format", &self.active_format())
            .field("title", &self.title())
            .field("generation", &self.generation)
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

/// Run renderer work, turning a panic into an error
fn guarded<T>(work: impl FnOnce() -> Result<T, ReaderError>) -> Result<T, ReaderError> {
    panic::catch_unwind(AssertUnwindSafe(work))
        .unwrap_or_else(|payload| Err(ReaderError::RendererGone(panic_message(&*payload))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "renderer panicked".to_string()
    }
}
