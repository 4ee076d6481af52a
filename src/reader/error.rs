//! Error types for reading sessions

use thiserror::Error;

use crate::library::MediaType;

/// Errors that can occur while opening or driving a book
#[derive(Debug, Error)]
pub enum ReaderError {
    /// No renderer exists for the stored media type
    #[error("Cannot open books of type {0}")]
    UnsupportedFormat(MediaType),

    /// Stored payload is not valid base64
    #[error("Stored book data is corrupt: {0}")]
    Decode(#[from] base64::DecodeError),

    /// EPUB renderer rejected the document
    #[error("Could not read EPUB: {0}")]
    Epub(String),

    /// PDF renderer rejected the document
    #[error("Could not read PDF: {0}")]
    Pdf(String),

    /// Document parsed but has nothing to show
    #[error("Document has no pages")]
    EmptyDocument,

    /// Page request outside `1..=page_count`
    #[error("Page {page} is out of range (1-{count})")]
    PageOutOfRange {
        /// Requested page
        page: usize,
        /// Pages in the document
        count: usize,
    },

    /// Renderer task ended without reporting back
    #[error("Renderer stopped unexpectedly: {0}")]
    RendererGone(String),
}
