//! Catalogue XML generation for legacy releases.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ident::join_link;
use crate::model::{Catalogue, DocumentEntry};
use crate::parser::CatalogueError;

/// Root element of generated descriptors.
pub const ROOT_ELEMENT: &str = "rtems-docs";

/// A release published before catalogues existed, described by its manual
/// list and where the HTML and PDF builds live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LegacyRelease {
    /// Release name, used as the catalogue title and the file name
    pub name: String,

    /// Publication date label
    #[serde(default)]
    pub date: String,

    /// Base of the HTML builds
    #[serde(default)]
    pub html: String,

    /// Base of the PDF builds
    #[serde(default)]
    pub pdf: String,

    /// Each manual's HTML lives in `<html>/<manual>/index.html` rather than
    /// `<html>/<manual>.html`
    #[serde(default)]
    pub index_per_doc: bool,

    /// Manual names in catalogue order
    #[serde(default)]
    pub manuals: Vec<String>,
}

impl LegacyRelease {
    /// Build the catalogue of this release.
    ///
    /// `titles` maps manual names to display titles; names are matched
    /// ignoring ASCII case. A manual without a title is an error.
    pub fn catalogue(&self, titles: &BTreeMap<String, String>) -> Result<Catalogue, CatalogueError> {
        let entries = self
            .manuals
            .iter()
            .map(|manual| {
                let title = titles
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(manual))
                    .map(|(_, title)| title.clone())
                    .ok_or_else(|| CatalogueError::MissingTitle {
                        release: self.name.clone(),
                        manual: manual.clone(),
                    })?;

                let html = if self.index_per_doc {
                    format!("{}/index.html", manual)
                } else {
                    format!("{}.html", manual)
                };

                Ok(DocumentEntry {
                    name: manual.clone(),
                    title,
                    legacy: true,
                    release: self.name.clone(),
                    version: self.name.clone(),
                    html: Some(join_link(&self.html, &html)),
                    pdf: Some(join_link(&self.pdf, &format!("{}.pdf", manual))),
                    singlehtml: None,
                })
            })
            .collect::<Result<Vec<_>, CatalogueError>>()?;

        Ok(Catalogue {
            date: self.date.clone(),
            title: self.name.clone(),
            entries,
        })
    }
}

/// Serialize a catalogue as an indented descriptor document.
pub fn write_catalogue(catalogue: &Catalogue) -> Result<String, CatalogueError> {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

    let mut serializer = quick_xml::se::Serializer::with_root(&mut xml, Some(ROOT_ELEMENT))
        .map_err(|e| CatalogueError::WriteError(e.to_string()))?;
    serializer.indent(' ', 2);
    catalogue
        .serialize(serializer)
        .map_err(|e| CatalogueError::WriteError(e.to_string()))?;

    xml.push('\n');
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_catalogue;
    use pretty_assertions::assert_eq;

    fn titles() -> BTreeMap<String, String> {
        [
            ("c_user", "RTEMS C User Guide"),
            ("posix_users", "RTEMS POSIX API User Guide"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn release(index_per_doc: bool) -> LegacyRelease {
        LegacyRelease {
            name: "4.10.2".to_string(),
            date: "21st Jan 2017".to_string(),
            html: "4.10.2/html".to_string(),
            pdf: "4.10.2/pdf".to_string(),
            index_per_doc,
            manuals: vec!["c_user".to_string(), "POSIX_users".to_string()],
        }
    }

    #[test]
    fn builds_legacy_entries_in_manual_order() {
        let catalogue = release(false).catalogue(&titles()).unwrap();

        assert_eq!(catalogue.title, "4.10.2");
        assert_eq!(catalogue.date, "21st Jan 2017");

        let names: Vec<_> = catalogue.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["c_user", "POSIX_users"]);

        let first = &catalogue.entries[0];
        assert_eq!(first.title, "RTEMS C User Guide");
        assert!(first.legacy);
        assert_eq!(first.release, "4.10.2");
        assert_eq!(first.version, "4.10.2");
        assert_eq!(first.html.as_deref(), Some("4.10.2/html/c_user.html"));
        assert_eq!(first.pdf.as_deref(), Some("4.10.2/pdf/c_user.pdf"));
        assert_eq!(first.singlehtml, None);
        assert_eq!(catalogue.entries[1].title, "RTEMS POSIX API User Guide");
    }

    #[test]
    fn index_per_doc_links_to_directories() {
        let catalogue = release(true).catalogue(&titles()).unwrap();

        assert_eq!(
            catalogue.entries[0].html.as_deref(),
            Some("4.10.2/html/c_user/index.html")
        );
    }

    #[test]
    fn manual_without_title_is_an_error() {
        let mut release = release(false);
        release.manuals.push("bsp_howto".to_string());

        let result = release.catalogue(&titles());

        assert!(matches!(
            result,
            Err(CatalogueError::MissingTitle { manual, .. }) if manual == "bsp_howto"
        ));
    }

    #[test]
    fn written_descriptor_reads_back() {
        let catalogue = release(true).catalogue(&titles()).unwrap();

        let xml = write_catalogue(&catalogue).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rtems-docs date=\"21st Jan 2017\">"));
        assert!(xml.contains("<legacy>Yes</legacy>"));
        assert!(!xml.contains("<singlehtml"));
        assert_eq!(parse_catalogue(&xml).unwrap(), catalogue);
    }

    #[test]
    fn escapes_text() {
        let catalogue = Catalogue {
            date: "2021".to_string(),
            title: "Tools & <Drivers>".to_string(),
            entries: vec![],
        };

        let xml = write_catalogue(&catalogue).unwrap();

        assert!(xml.contains("<catalogue>Tools &amp; &lt;Drivers"));
        assert_eq!(parse_catalogue(&xml).unwrap().title, "Tools & <Drivers>");
    }
}
