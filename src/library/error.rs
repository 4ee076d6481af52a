//! Error types for library mutations

use thiserror::Error;

use super::model::MediaType;
use crate::storage::StorageError;

/// Errors that can occur when changing the library
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Title missing or whitespace only
    #[error("A book needs a title")]
    EmptyTitle,

    /// No file bytes were supplied
    #[error("The selected file is empty")]
    EmptyFile,

    /// Only EPUB and PDF can be stored
    #[error("Unsupported file type: {0}")]
    UnsupportedMediaType(MediaType),

    /// File exceeds the configured cap
    #[error("File is too large ({size} bytes, limit {limit} bytes)")]
    TooLarge {
        /// Size of the rejected file
        size: usize,
        /// Configured maximum
        limit: usize,
    },

    /// Index no longer points at a book
    #[error("No book at position {index} (library has {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Library length at the time of the request
        len: usize,
    },

    /// Collection could not be serialized
    #[error("Failed to serialize library: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Backend write failed; the in-memory library is unchanged
    #[error(transparent)]
    Storage(#[from] StorageError),
}
