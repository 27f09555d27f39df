//! Catalogue data model.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ident::panel_id;

/// A dated collection of manuals, as described by one catalogue XML file.
///
/// Every field defaults to empty so that a descriptor with missing parts
/// still renders, just with blank labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalogue {
    /// Publication date label (the root `date` attribute)
    #[serde(rename = "@date", default)]
    pub date: String,

    /// Catalogue title (the `catalogue` element)
    #[serde(rename = "catalogue", default)]
    pub title: String,

    /// Documents in catalogue order
    #[serde(rename = "doc", default)]
    pub entries: Vec<DocumentEntry>,
}

impl Catalogue {
    /// Identifier of the panel this catalogue renders into.
    pub fn panel_id(&self) -> String {
        panel_id(&self.title)
    }
}

/// One manual in a catalogue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEntry {
    /// Short manual name (e.g. `c-user`)
    #[serde(default)]
    pub name: String,

    /// Human readable title
    #[serde(default)]
    pub title: String,

    /// Set for manuals of legacy releases
    #[serde(
        default,
        deserialize_with = "yes_flag",
        serialize_with = "yes_text",
        skip_serializing_if = "is_false"
    )]
    pub legacy: bool,

    /// Release the manual belongs to
    #[serde(default)]
    pub release: String,

    /// Manual version
    #[serde(default)]
    pub version: String,

    /// Relative path to the multi-page HTML version
    #[serde(
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub html: Option<String>,

    /// Relative path to the PDF version
    #[serde(
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub pdf: Option<String>,

    /// Relative path to the single-page HTML version
    #[serde(
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub singlehtml: Option<String>,
}

/// A rendering of a manual that a catalogue may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Multi-page HTML
    Online,
    /// PDF
    Pdf,
    /// Single-page HTML
    SinglePage,
}

impl Format {
    /// All formats, in table column order.
    pub const ALL: [Format; 3] = [Format::Online, Format::Pdf, Format::SinglePage];

    /// Column heading for this format.
    pub fn label(&self) -> &'static str {
        match self {
            Format::Online => "Online",
            Format::Pdf => "PDF",
            Format::SinglePage => "Single Page",
        }
    }
}

impl DocumentEntry {
    /// Relative path of the given format, if the entry offers it.
    pub fn format(&self, format: Format) -> Option<&str> {
        match format {
            Format::Online => self.html.as_deref(),
            Format::Pdf => self.pdf.as_deref(),
            Format::SinglePage => self.singlehtml.as_deref(),
        }
    }

    /// Number of formats this entry offers.
    pub fn format_count(&self) -> usize {
        Format::ALL
            .iter()
            .filter(|f| self.format(**f).is_some())
            .count()
    }
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

fn yes_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.is_some_and(|v| v.trim().eq_ignore_ascii_case("yes")))
}

fn yes_text<S>(legacy: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(if *legacy { "Yes" } else { "No" })
}

fn is_false(value: &bool) -> bool {
    !value
}
