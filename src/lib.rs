//! Tusach - a terminal bookshelf for EPUB and PDF files
//!
//! Books are stored as base64 payloads in a small key-value store and opened
//! in a reader session that renders one EPUB spread or PDF page at a time.

pub mod app;
pub mod config;
pub mod library;
pub mod reader;
pub mod storage;
pub mod theme;
pub mod ui;

pub use app::App;
pub use config::Config;
pub use theme::Theme;
