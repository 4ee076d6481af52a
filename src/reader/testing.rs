//! In-memory renderers for exercising sessions without real documents
//!
//! Payload bytes steer the fakes: `broken` fails to parse, `panic` panics
//! (EPUB), `empty` yields a zero-page PDF. Anything else opens a 3-page EPUB
//! or a 10-page PDF.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::error::ReaderError;
use super::render::{
    EpubEngine, EpubRendition, Location, PdfDocument, PdfEngine, Relocation, RenderParams,
    RenderedPage, Renderers, RenditionConfig,
};
use super::session::RelocationSink;

pub const FAKE_EPUB_PAGES: usize = 3;
pub const FAKE_PDF_PAGES: usize = 10;

pub struct FakeRendition {
    pages: usize,
    current: usize,
    sink: RelocationSink,
    drops: Arc<AtomicUsize>,
    layout: Arc<Mutex<(u16, u16)>>,
}

impl FakeRendition {
    fn report(&self) {
        self.sink.emit(Relocation {
            location: Location(format!("0:{}", self.current)),
            page: self.current + 1,
            total: self.pages,
            at_start: self.current == 0,
            at_end: self.current + 1 == self.pages,
        });
    }
}

impl EpubRendition for FakeRendition {
    fn display(&mut self, _target: Option<&Location>) -> Result<(), ReaderError> {
        self.current = 0;
        self.report();
        Ok(())
    }

    fn next(&mut self) {
        if self.current + 1 < self.pages {
            self.current += 1;
            self.report();
        }
    }

    fn prev(&mut self) {
        if self.current > 0 {
            self.current -= 1;
            self.report();
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        if let Ok(mut layout) = self.layout.lock() {
            *layout = (width, height);
        }
        self.report();
    }

    fn view(&self) -> Vec<Vec<String>> {
        vec![vec![format!("epub page {}", self.current + 1)]]
    }
}

impl Drop for FakeRendition {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// EPUB engine counting dropped renditions and recording the last layout size
#[derive(Default)]
pub struct FakeEpubEngine {
    pub drops: Arc<AtomicUsize>,
    pub layout: Arc<Mutex<(u16, u16)>>,
}

impl EpubEngine for FakeEpubEngine {
    fn open(
        &self,
        bytes: Vec<u8>,
        config: RenditionConfig,
        relocations: RelocationSink,
    ) -> Result<Box<dyn EpubRendition>, ReaderError> {
        match bytes.as_slice() {
            b"broken" => Err(ReaderError::Epub("missing container.xml".into())),
            b"panic" => panic!("engine exploded"),
            _ => {
                if let Ok(mut layout) = self.layout.lock() {
                    *layout = (config.width, config.height);
                }
                Ok(Box::new(FakeRendition {
                    pages: FAKE_EPUB_PAGES,
                    current: 0,
                    sink: relocations,
                    drops: Arc::clone(&self.drops),
                    layout: Arc::clone(&self.layout),
                }))
            }
        }
    }
}

pub struct FakePdf {
    pages: usize,
}

impl PdfDocument for FakePdf {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn render_page(&self, number: usize, params: RenderParams) -> Result<RenderedPage, ReaderError> {
        if number == 0 || number > self.pages {
            return Err(ReaderError::PageOutOfRange { page: number, count: self.pages });
        }
        Ok(RenderedPage {
            number,
            width: params.max_width,
            lines: vec![format!("pdf page {number}")],
        })
    }
}

pub struct FakePdfEngine;

impl PdfEngine for FakePdfEngine {
    fn parse(&self, bytes: Vec<u8>) -> Result<Arc<dyn PdfDocument>, ReaderError> {
        match bytes.as_slice() {
            b"broken" => Err(ReaderError::Pdf("no trailer".into())),
            b"empty" => Ok(Arc::new(FakePdf { pages: 0 })),
            _ => Ok(Arc::new(FakePdf { pages: FAKE_PDF_PAGES })),
        }
    }
}

pub fn fake_renderers(epub: FakeEpubEngine) -> Renderers {
    Renderers { epub: Arc::new(epub), pdf: Arc::new(FakePdfEngine) }
}
