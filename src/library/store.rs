//! Library persistence
//!
//! The ordered book collection lives in memory and under a single storage
//! key. Every mutation writes the whole collection before it is committed, so
//! the two never disagree.

use tracing::{debug, info, warn};

use super::error::LibraryError;
use super::model::{BookRecord, MediaType};
use crate::storage::KeyValueStore;

/// Storage key holding the serialized collection
pub const LIBRARY_KEY: &str = "books";

/// Owned book collection backed by a key-value store
#[derive(Debug)]
pub struct LibraryStore<S> {
    storage: S,
    books: Vec<BookRecord>,
    max_payload_bytes: Option<usize>,
}

impl<S: KeyValueStore> LibraryStore<S> {
    /// Load the collection from `storage`.
    ///
    /// Missing or malformed data yields an empty library; this never fails.
    pub fn load(mut storage: S) -> Self {
        let books = Self::read(&mut storage).unwrap_or_default();
        Self { storage, books, max_payload_bytes: None }
    }

    /// Re-read the collection, picking up writes made by another process.
    ///
    /// If storage cannot be read or parsed, the books already in memory are kept.
    pub fn reload(&mut self) {
        if let Some(books) = Self::read(&mut self.storage) {
            self.books = books;
        }
    }

    /// Parse, migrate and clean the stored collection, writing it back if anything changed
    fn read(storage: &mut S) -> Option<Vec<BookRecord>> {
        let raw = match storage.get(LIBRARY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Some(Vec::new()),
            Err(e) => {
                warn!("Could not read library: {}", e);
                return None;
            }
        };

        let parsed: Vec<BookRecord> = match serde_json::from_str(&raw) {
            Ok(books) => books,
            Err(e) => {
                warn!("Stored library is malformed: {}", e);
                return None;
            }
        };

        let total = parsed.len();
        let mut cleaned = false;
        let mut books = Vec::with_capacity(total);
        for mut record in parsed {
            cleaned |= record.migrate_legacy();
            if record.is_valid() {
                books.push(record);
            } else {
                cleaned = true;
            }
        }

        if books.len() < total {
            warn!("Dropped {} invalid book record(s)", total - books.len());
        }
        if cleaned {
            if let Err(e) = Self::persist(storage, &books) {
                warn!("Could not write cleaned library back: {}", e);
            }
        }

        debug!("Loaded {} book(s)", books.len());
        Some(books)
    }

    /// Cap the size of files accepted by [`add`](Self::add)
    pub fn with_max_payload_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_payload_bytes = limit;
        self
    }

    /// Current collection in display order
    pub fn list(&self) -> &[BookRecord] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BookRecord> {
        self.books.get(index)
    }

    /// Encode `bytes` into a new record and append it
    pub fn add(
        &mut self,
        title: &str,
        bytes: &[u8],
        media_type: MediaType,
    ) -> Result<&BookRecord, LibraryError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(LibraryError::EmptyTitle);
        }
        if bytes.is_empty() {
            return Err(LibraryError::EmptyFile);
        }
        if !media_type.is_supported() {
            return Err(LibraryError::UnsupportedMediaType(media_type));
        }
        if let Some(limit) = self.max_payload_bytes {
            if bytes.len() > limit {
                return Err(LibraryError::TooLarge { size: bytes.len(), limit });
            }
        }

        let mut next = self.books.clone();
        next.push(BookRecord::new(title, bytes, media_type));
        self.commit(next)?;

        info!("Added {:?} ({} bytes)", title, bytes.len());
        let index = self.books.len() - 1;
        Ok(&self.books[index])
    }

    /// Remove the record at `index`, shifting later records down
    pub fn remove(&mut self, index: usize) -> Result<BookRecord, LibraryError> {
        if index >= self.books.len() {
            return Err(LibraryError::IndexOutOfRange { index, len: self.books.len() });
        }

        let mut next = self.books.clone();
        let removed = next.remove(index);
        self.commit(next)?;

        info!("Removed {:?}", removed.title);
        Ok(removed)
    }

    /// Access the backing store (used by tests and tooling)
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn commit(&mut self, next: Vec<BookRecord>) -> Result<(), LibraryError> {
        Self::persist(&mut self.storage, &next)?;
        self.books = next;
        Ok(())
    }

    /// Write `books`; an empty library drops the key, which loads as empty
    fn persist(storage: &mut S, books: &[BookRecord]) -> Result<(), LibraryError> {
        if books.is_empty() {
            storage.remove(LIBRARY_KEY)?;
        } else {
            storage.set(LIBRARY_KEY, &serde_json::to_string(books)?)?;
        }
        Ok(())
    }
}
