//! Catalogue XML extraction.

use crate::model::Catalogue;

/// Errors that can occur when reading or writing a catalogue descriptor.
#[derive(Debug, thiserror::Error)]
pub enum CatalogueError {
    #[error("Invalid catalogue XML: {0}")]
    InvalidXml(String),

    #[error("Failed to write catalogue XML: {0}")]
    WriteError(String),

    #[error("No title for manual {manual} of release {release}")]
    MissingTitle { release: String, manual: String },
}

/// Parse a catalogue descriptor.
///
/// The root element carries the `date` attribute and a `catalogue` title;
/// each `doc` child becomes one entry, kept in document order. Missing
/// fields come back empty. Only XML that cannot be read at all is an error.
pub fn parse_catalogue(xml: &str) -> Result<Catalogue, CatalogueError> {
    quick_xml::de::from_str(xml).map_err(|e| CatalogueError::InvalidXml(e.to_string()))
}
