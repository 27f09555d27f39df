//! Documentation catalogue model and XML extraction.
//!
//! This crate reads the catalogue descriptor published next to a set of
//! manuals and exposes its entries, along with the identifier rules used
//! to place a catalogue on a page. Descriptors for legacy releases, which
//! predate published catalogues, can be generated from a manual list.

pub mod generate;
pub mod ident;
pub mod model;
pub mod parser;

pub use generate::{write_catalogue, LegacyRelease, ROOT_ELEMENT};
pub use ident::{join_link, normalize_path, panel_id, tag_for};
pub use model::{Catalogue, DocumentEntry, Format};
pub use parser::{parse_catalogue, CatalogueError};
