//! Catalogue to markup rendering.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use docshelf_catalogue::{join_link, Catalogue, DocumentEntry};

use crate::panel::PanelBinding;
use crate::templates::{PanelContext, Row, TemplateEngine};

/// Rendered HTML. Cheap to clone, never modified after rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup(Arc<str>);

impl Markup {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Markup {
    fn from(html: String) -> Self {
        Self(html.into())
    }
}

impl AsRef<str> for Markup {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Options controlling how panels are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Prefix of container ids; also the id of the accordion parent
    pub container_prefix: String,

    /// Icon shown for PDF links
    pub pdf_icon: String,

    /// Icon shown for single-page HTML links
    pub html_icon: String,

    /// Icon width and height in pixels
    pub icon_size: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            container_prefix: "rtems-catalogue".to_string(),
            pdf_icon: "static/img/Adobe_PDF_file_icon_32x32.png".to_string(),
            html_icon: "static/img/html-xxl.png".to_string(),
            icon_size: 20,
        }
    }
}

impl RenderOptions {
    /// Id of the container element for `tag`.
    pub fn container_id(&self, tag: &str) -> String {
        format!("{}-{}", self.container_prefix, tag)
    }
}

/// A catalogue rendered for one container.
#[derive(Debug, Clone)]
pub struct RenderedCatalogue {
    /// Container tag
    pub tag: String,

    /// Catalogue title
    pub title: String,

    /// Table rows, in catalogue order
    pub rows: Vec<Row>,

    /// Panel markup
    pub markup: Markup,

    /// Handlers to attach once the markup is on the page
    pub binding: PanelBinding,
}

/// Errors that can occur while rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to render template: {0}")]
    TemplateError(String),
}

/// Renders catalogues and pages.
#[derive(Debug, Default)]
pub struct Renderer {
    templates: TemplateEngine,
    options: RenderOptions,
}

impl Renderer {
    /// Create a renderer using the built-in templates.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            templates: TemplateEngine::new(),
            options,
        }
    }

    /// Create a renderer that prefers templates from `templates_dir`.
    pub fn with_templates(options: RenderOptions, templates_dir: Option<PathBuf>) -> Self {
        let templates = match templates_dir {
            Some(dir) => TemplateEngine::with_overrides(dir),
            None => TemplateEngine::new(),
        };
        Self { templates, options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn templates(&self) -> &TemplateEngine {
        &self.templates
    }

    /// Render `catalogue` for the container `tag`, with links under `path`.
    pub fn render(
        &self,
        catalogue: &Catalogue,
        path: &str,
        tag: &str,
        show: bool,
    ) -> Result<RenderedCatalogue, RenderError> {
        render_catalogue(&self.templates, catalogue, path, tag, show, &self.options)
    }
}

/// Render a catalogue panel.
///
/// Pure: the result only depends on the arguments. Rows keep the order of
/// the catalogue entries.
pub fn render_catalogue(
    templates: &TemplateEngine,
    catalogue: &Catalogue,
    path: &str,
    tag: &str,
    show: bool,
    options: &RenderOptions,
) -> Result<RenderedCatalogue, RenderError> {
    let panel_id = catalogue.panel_id();
    let rows: Vec<Row> = catalogue
        .entries
        .iter()
        .map(|entry| row_for(entry, path))
        .collect();

    let context = PanelContext {
        panel_id: panel_id.clone(),
        accordion: options.container_prefix.clone(),
        date: catalogue.date.clone(),
        title: catalogue.title.clone(),
        rows: rows.clone(),
        pdf_icon: options.pdf_icon.clone(),
        html_icon: options.html_icon.clone(),
        icon_size: options.icon_size,
    };

    let html = templates
        .render_panel(&context)
        .map_err(|e| RenderError::TemplateError(e.to_string()))?;

    Ok(RenderedCatalogue {
        tag: tag.to_string(),
        title: catalogue.title.clone(),
        rows,
        markup: Markup::from(html),
        binding: PanelBinding::new(tag, panel_id, options.container_id(tag), show),
    })
}

fn row_for(entry: &DocumentEntry, path: &str) -> Row {
    let link = |file: &Option<String>| file.as_deref().map(|f| join_link(path, f));

    Row {
        title: entry.title.clone(),
        online: link(&entry.html),
        pdf: link(&entry.pdf),
        single_page: link(&entry.singlehtml),
    }
}
