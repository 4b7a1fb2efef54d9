//! Field placement and signing core for the fieldsign Android shell.
//!
//! The shell sends JSON commands through the JNI entry point and
//! renders the JSON UI tree it gets back. Field positions are stored as
//! percentages of the page and projected to pixels at whatever size the
//! page was rendered.

pub mod config;
pub mod document;
pub mod error;
pub mod features;
pub mod geometry;
pub mod logging;
mod router;
pub mod state;
pub mod store;
pub mod ui;

pub use document::{Document, DocumentField, DocumentId, DocumentStatus, FieldId, Recipient};
pub use error::EditorError;
pub use features::catalog::FieldType;
pub use geometry::{to_percent, to_pixel, PageSize, Point, Position};
pub use store::{DocumentStore, MemoryStore};
