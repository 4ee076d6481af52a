//! Persisted book records
//!
//! A record carries the whole uploaded file as base64 text, because the
//! backing store only holds text.

use std::fmt;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

/// MIME string for EPUB books
pub const EPUB_MIME: &str = "application/epub+zip";

/// MIME string for PDF documents
pub const PDF_MIME: &str = "application/pdf";

/// Format discriminator for a stored book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MediaType {
    Epub,
    Pdf,
    /// Anything else, kept verbatim so it round-trips through storage
    Unknown(String),
}

impl Default for MediaType {
    fn default() -> Self {
        MediaType::Unknown(String::new())
    }
}

impl MediaType {
    /// The MIME string written to storage
    pub fn as_mime(&self) -> &str {
        match self {
            MediaType::Epub => EPUB_MIME,
            MediaType::Pdf => PDF_MIME,
            MediaType::Unknown(s) => s,
        }
    }

    /// Whether a reader exists for this type
    pub fn is_supported(&self) -> bool {
        !matches!(self, MediaType::Unknown(_))
    }

    /// Guess from a file extension (`.epub` / `.pdf`, any case)
    pub fn from_path(path: &Path) -> MediaType {
        let ext = path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase());
        match ext.as_deref() {
            Some("epub") => MediaType::Epub,
            Some("pdf") => MediaType::Pdf,
            Some(other) => MediaType::Unknown(format!(".{other}")),
            None => MediaType::Unknown(String::new()),
        }
    }

    /// Short label for listings
    pub fn label(&self) -> &str {
        match self {
            MediaType::Epub => "epub",
            MediaType::Pdf => "pdf",
            MediaType::Unknown(_) => "?",
        }
    }
}

impl From<String> for MediaType {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            EPUB_MIME | "epub" => MediaType::Epub,
            PDF_MIME | "pdf" => MediaType::Pdf,
            _ => MediaType::Unknown(s),
        }
    }
}

impl From<&str> for MediaType {
    fn from(s: &str) -> Self {
        MediaType::from(s.to_string())
    }
}

impl From<MediaType> for String {
    fn from(m: MediaType) -> Self {
        match m {
            MediaType::Unknown(s) => s,
            known => known.as_mime().to_string(),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Unknown(s) if s.is_empty() => f.write_str("unknown"),
            other => f.write_str(other.as_mime()),
        }
    }
}

/// One uploaded document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    /// Display title, never empty once stored
    pub title: String,
    /// Base64 of the original file bytes
    #[serde(alias = "fileData")]
    pub payload: String,
    /// Format discriminator
    #[serde(default)]
    pub media_type: MediaType,
}

impl BookRecord {
    /// Build a record by encoding `bytes`
    pub fn new(title: impl Into<String>, bytes: &[u8], media_type: MediaType) -> Self {
        Self { title: title.into(), payload: BASE64.encode(bytes), media_type }
    }

    /// Decode the payload back into file bytes
    pub fn decode_payload(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(self.payload.as_bytes())
    }

    /// Approximate decoded size in bytes
    pub fn size_hint(&self) -> usize {
        self.payload.len() / 4 * 3
    }

    /// Whether the record satisfies the stored-record invariants
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.payload.is_empty()
    }

    /// Upgrade a record written before `mediaType` existed.
    ///
    /// Those records stored a data URL; its declared MIME becomes the media
    /// type and the body becomes the payload. Returns true if anything changed.
    pub fn migrate_legacy(&mut self) -> bool {
        let Some(uri) = DataUri::parse(&self.payload) else {
            return false;
        };
        if !self.media_type.is_supported() {
            self.media_type = MediaType::from(uri.mime);
        }
        self.payload = uri.body.to_string();
        true
    }
}

/// A `data:<mime>;base64,<body>` URL split into its parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUri<'a> {
    pub mime: &'a str,
    pub body: &'a str,
}

impl<'a> DataUri<'a> {
    /// Parse a base64 data URL; anything else yields `None`
    pub fn parse(s: &'a str) -> Option<Self> {
        let rest = s.strip_prefix("data:")?;
        let (header, body) = rest.split_once(',')?;
        let mime = header.strip_suffix(";base64")?;
        Some(Self { mime, body })
    }
}
