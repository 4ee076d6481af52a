//! The book library: records, persistence and their errors

pub mod error;
pub mod model;
pub mod store;

pub use error::LibraryError;
pub use model::{BookRecord, DataUri, MediaType};
pub use store::{LIBRARY_KEY, LibraryStore};
