//! Loading collaborators: turn raw bytes into tables for the engine.

mod loader;
mod source;

pub use loader::{Loader, LoaderConfig};
pub use source::{LoadedTable, SourceFormat, SourceMetadata};
