//! Template engine for catalogue panels and the page that holds them.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use minijinja::{context, AutoEscape, Environment, Error, ErrorKind};

/// One row of a catalogue table, links already joined with the base path.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Row {
    /// Document title, used as the Online link label
    pub title: String,
    /// Link to the multi-page HTML version
    pub online: Option<String>,
    /// Link to the PDF version
    pub pdf: Option<String>,
    /// Link to the single-page HTML version
    pub single_page: Option<String>,
}

impl Row {
    /// Number of cells that carry a link.
    pub fn link_count(&self) -> usize {
        [&self.online, &self.pdf, &self.single_page]
            .iter()
            .filter(|l| l.is_some())
            .count()
    }
}

/// Context for rendering one catalogue panel.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PanelContext {
    /// Panel identifier
    pub panel_id: String,
    /// Id of the accordion element grouping all panels
    pub accordion: String,
    /// Date label
    pub date: String,
    /// Catalogue title
    pub title: String,
    /// Table rows in catalogue order
    pub rows: Vec<Row>,
    /// PDF icon URL
    pub pdf_icon: String,
    /// HTML icon URL
    pub html_icon: String,
    /// Icon width and height in pixels
    pub icon_size: u32,
}

/// A page container as seen by the page template.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ContainerView {
    /// Element id
    pub id: String,
    /// Display name, shown when nothing was painted
    pub name: String,
    /// Painted panel markup
    pub markup: Option<String>,
    /// Script line binding the panel handlers
    pub bind: Option<String>,
}

/// Context for rendering a full page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PageContext {
    /// Page title
    pub title: String,
    /// Id of the accordion element grouping all panels
    pub accordion: String,
    /// Catalogue containers in page order
    pub containers: Vec<ContainerView>,
    /// Stylesheets to link
    pub styles: Vec<String>,
    /// Scripts the panels depend on (collapse framework)
    pub scripts: Vec<String>,
    /// URL of the panel runtime script
    pub runtime: String,
}

/// Template engine using minijinja.
///
/// Templates ending in `.html` are auto-escaped, so every catalogue field
/// is escaped unless a template marks it `safe`. Slashes are left alone so
/// links stay readable.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a template engine that prefers templates found in `dir`.
    ///
    /// `catalogue.html` and `page.html` can be overridden; anything not
    /// found in the directory falls back to the built-in version.
    pub fn with_overrides(dir: impl Into<PathBuf>) -> Self {
        Self::build(Some(dir.into()))
    }

    fn build(overrides: Option<PathBuf>) -> Self {
        let mut env = Environment::new();

        if let Some(dir) = &overrides {
            tracing::debug!("Template overrides from {}", dir.display());
        }
        let dir_loader = overrides.map(minijinja::path_loader);

        env.set_formatter(|out, state, value| {
            if matches!(state.auto_escape(), AutoEscape::Html) && !value.is_safe() {
                if let Some(text) = value.as_str() {
                    return out
                        .write_str(&escape_html(text))
                        .map_err(|_| Error::new(ErrorKind::WriteFailure, "failed to write output"));
                }
            }
            minijinja::escape_formatter(out, state, value)
        });

        env.set_loader(move |name| {
            if let Some(load) = &dir_loader {
                if let Some(source) = load(name)? {
                    return Ok(Some(source));
                }
            }
            Ok(builtin(name).map(str::to_string))
        });

        Self { env }
    }

    /// Render a catalogue panel.
    pub fn render_panel(&self, panel: &PanelContext) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("catalogue.html")?;

        tmpl.render(context! {
            panel_id => &panel.panel_id,
            accordion => &panel.accordion,
            date => &panel.date,
            title => &panel.title,
            rows => &panel.rows,
            pdf_icon => &panel.pdf_icon,
            html_icon => &panel.html_icon,
            icon_size => panel.icon_size,
        })
    }

    /// Render a full page.
    pub fn render_page(&self, page: &PageContext) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("page.html")?;

        tmpl.render(context! {
            title => &page.title,
            accordion => &page.accordion,
            containers => &page.containers,
            styles => &page.styles,
            scripts => &page.scripts,
            runtime => &page.runtime,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine").finish_non_exhaustive()
    }
}

/// Escape text for HTML element content and quoted attributes.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Look up a built-in template by name.
fn builtin(name: &str) -> Option<&'static str> {
    match name {
        "catalogue.html" => Some(CATALOGUE_TEMPLATE),
        "page.html" => Some(PAGE_TEMPLATE),
        _ => None,
    }
}

/// Write the built-in templates into `dir` as a starting point for overrides.
pub fn write_defaults(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join("catalogue.html"), CATALOGUE_TEMPLATE)?;
    std::fs::write(dir.join("page.html"), PAGE_TEMPLATE)?;
    Ok(())
}

const CATALOGUE_TEMPLATE: &str = r##"<div class="table-responsive">
 <table class="table table-hover table-condensed table-nonfluid">
  <thead>
   <tr id="{{ panel_id }}" class="accordion-toggle" data-toggle="collapse" data-parent="#{{ accordion }}" data-target=".{{ panel_id }}Details">
    <th><span class="label label-default">{{ date }}</span> {{ title }}</th>
    <th><i class="indicator glyphicon glyphicon-chevron-up pull-right"></i></th>
   </tr>
  </thead>
  <tbody>
   <tr>
    <td colspan="3" class="hiddenRow">
     <div class="accordion-body collapse {{ panel_id }}Details" id="{{ panel_id }}1">
      <table class="table table-hover table-condensed table-nonfluid">
       <thead><tr><th>Online</th><th>PDF</th><th>Single Page</th></tr></thead>
       <tbody>
{%- for row in rows %}
        <tr>
{%- if row.online %}
         <td><a href="{{ row.online }}">{{ row.title }}</a></td>
{%- else %}
         <td></td>
{%- endif %}
{%- if row.pdf %}
         <td><a href="{{ row.pdf }}"><img src="{{ pdf_icon }}" width="{{ icon_size }}" height="{{ icon_size }}"></a></td>
{%- else %}
         <td></td>
{%- endif %}
{%- if row.single_page %}
         <td><a href="{{ row.single_page }}"><img src="{{ html_icon }}" width="{{ icon_size }}" height="{{ icon_size }}"></a></td>
{%- else %}
         <td></td>
{%- endif %}
        </tr>
{%- endfor %}
       </tbody>
      </table>
     </div>
    </td>
   </tr>
  </tbody>
 </table>
</div>
"##;

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }}</title>
  {% for style in styles %}<link rel="stylesheet" href="{{ style }}">
  {% endfor %}
</head>
<body>
  <div id="{{ accordion }}" class="container">
  {% for c in containers %}
    <div id="{{ c.id }}">
    {% if c.markup %}{{ c.markup | safe }}{% else %}<b>{{ c.name }}</b> No catalogue found.{% endif %}
    </div>
  {% endfor %}
  </div>
  {% for script in scripts %}<script src="{{ script }}"></script>
  {% endfor %}<script src="{{ runtime }}"></script>
  <script>
  {% for c in containers %}{% if c.bind %}{{ c.bind | safe }}
  {% endif %}{% endfor %}
  </script>
</body>
</html>"##;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn panel(rows: Vec<Row>) -> PanelContext {
        PanelContext {
            panel_id: "C_User_Guide".to_string(),
            accordion: "rtems-catalogue".to_string(),
            date: "2021-01".to_string(),
            title: "C User Guide".to_string(),
            rows,
            pdf_icon: "pdf.png".to_string(),
            html_icon: "html.png".to_string(),
            icon_size: 20,
        }
    }

    #[test]
    fn renders_panel_shell() {
        let engine = TemplateEngine::new();
        let html = engine.render_panel(&panel(vec![])).unwrap();

        assert!(html.contains(r#"<tr id="C_User_Guide" class="accordion-toggle""#));
        assert!(html.contains(r#"data-target=".C_User_GuideDetails""#));
        assert!(html.contains(r#"id="C_User_Guide1""#));
        assert!(html.contains("<th>Online</th><th>PDF</th><th>Single Page</th>"));
        assert!(html.trim_end().ends_with("</div>"));
    }

    #[test]
    fn escapes_catalogue_fields() {
        let engine = TemplateEngine::new();
        let mut ctx = panel(vec![Row {
            title: "<script>".to_string(),
            online: Some("a?x=1&y=\"2\"".to_string()),
            pdf: None,
            single_page: None,
        }]);
        ctx.title = "Tools & <BSPs>".to_string();

        let html = engine.render_panel(&ctx).unwrap();

        assert!(html.contains("Tools &amp; &lt;BSPs&gt;"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("a?x=1&amp;y=&quot;2&quot;"));
    }

    #[test]
    fn keeps_slashes_in_links() {
        let engine = TemplateEngine::new();
        let html = engine
            .render_panel(&panel(vec![Row {
                title: "C User Guide".to_string(),
                online: Some("docs/c_user/index.html".to_string()),
                pdf: None,
                single_page: None,
            }]))
            .unwrap();

        assert!(html.contains(r#"<a href="docs/c_user/index.html">C User Guide</a>"#));
    }

    #[test]
    fn renders_placeholder_for_unpainted_container() {
        let engine = TemplateEngine::new();
        let page = PageContext {
            title: "Docs".to_string(),
            accordion: "rtems-catalogue".to_string(),
            containers: vec![ContainerView {
                id: "rtems-catalogue-5_1".to_string(),
                name: "5.1".to_string(),
                markup: None,
                bind: None,
            }],
            styles: vec![],
            scripts: vec![],
            runtime: "assets/shelf.js".to_string(),
        };

        let html = engine.render_page(&page).unwrap();

        assert!(html.contains(r#"<div id="rtems-catalogue-5_1">"#));
        assert!(html.contains("<b>5.1</b> No catalogue found."));
        assert!(html.contains(r#"<script src="assets/shelf.js"></script>"#));
    }

    #[test]
    fn prefers_override_directory() {
        let temp = tempdir().unwrap();
        std::fs::write(
            temp.path().join("catalogue.html"),
            "custom {{ title }} {{ rows | length }}",
        )
        .unwrap();

        let engine = TemplateEngine::with_overrides(temp.path());

        let html = engine.render_panel(&panel(vec![])).unwrap();
        assert_eq!(html, "custom C User Guide 0");

        // page.html was not overridden
        let page = PageContext {
            title: "Docs".to_string(),
            accordion: "a".to_string(),
            containers: vec![],
            styles: vec![],
            scripts: vec![],
            runtime: "r.js".to_string(),
        };
        assert!(engine.render_page(&page).unwrap().contains("<title>Docs</title>"));
    }

    #[test]
    fn writes_default_templates() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("templates");

        write_defaults(&dir).unwrap();

        assert!(dir.join("catalogue.html").exists());
        assert!(dir.join("page.html").exists());
    }
}
