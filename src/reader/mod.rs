//! Reading sessions and the engines that render books

pub mod epub;
pub mod error;
pub mod pdf;
pub mod render;
pub mod session;

pub use error::ReaderError;
pub use render::{Location, Relocation, RenderedPage, Renderers};
pub use session::{ActiveFormat, Position, ReaderSession, SessionUpdate, Surface, Viewport};

#[cfg(test)]
pub(crate) mod testing;
