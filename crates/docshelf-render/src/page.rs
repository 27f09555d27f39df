//! Page model: the containers catalogues are painted into.
//!
//! A [`Page`] stands in for the browser document. Each container is keyed
//! by its tag; painting replaces the whole content of a container. Loads
//! take a [`PaintTicket`] before fetching, and only the most recently
//! issued ticket of a tag may paint, so a slow superseded load is dropped
//! instead of overwriting a newer one.

use crate::panel::PanelBinding;
use crate::render::{Markup, RenderOptions, RenderedCatalogue};
use crate::templates::{ContainerView, PageContext, TemplateEngine};

/// Permission to paint one container, issued when a load starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaintTicket {
    tag: String,
    seq: u64,
}

impl PaintTicket {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// What happened to a paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOutcome {
    /// The container now shows the new markup
    Applied,

    /// A newer load of the same tag started after this one; nothing changed
    Superseded { latest: u64 },
}

/// One catalogue container.
#[derive(Debug, Clone)]
pub struct Container {
    tag: String,
    name: String,
    issued: u64,
    painted: Option<Painted>,
}

/// Content of a painted container.
#[derive(Debug, Clone)]
pub struct Painted {
    /// Ticket sequence that produced this content
    pub seq: u64,
    /// Panel markup
    pub markup: Markup,
    /// Handlers bound to the panel
    pub binding: PanelBinding,
}

impl Container {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Display name used by the "no catalogue" placeholder.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn painted(&self) -> Option<&Painted> {
        self.painted.as_ref()
    }

    pub fn markup(&self) -> Option<&Markup> {
        self.painted.as_ref().map(|p| &p.markup)
    }
}

/// Settings for rendering a page to HTML.
#[derive(Debug, Clone, Default)]
pub struct PageSettings {
    /// Page title
    pub title: String,
    /// Stylesheets to link
    pub styles: Vec<String>,
    /// Scripts providing the collapse framework
    pub scripts: Vec<String>,
    /// URL of the panel runtime script
    pub runtime: String,
}

/// The containers of one page, in page order.
#[derive(Debug, Clone, Default)]
pub struct Page {
    containers: Vec<Container>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a container. Declaring an existing tag only updates its name.
    pub fn add_container(&mut self, tag: &str, name: &str) {
        match self.position(tag) {
            Some(i) => self.containers[i].name = name.to_string(),
            None => self.containers.push(Container {
                tag: tag.to_string(),
                name: name.to_string(),
                issued: 0,
                painted: None,
            }),
        }
    }

    /// Start a load for `tag`, superseding any load already in flight.
    ///
    /// Unknown tags get a container named after the tag.
    pub fn begin(&mut self, tag: &str) -> PaintTicket {
        let container = self.entry(tag);
        container.issued += 1;

        PaintTicket {
            tag: tag.to_string(),
            seq: container.issued,
        }
    }

    /// Replace the content of the ticket's container with `rendered`.
    pub fn paint(&mut self, ticket: PaintTicket, rendered: RenderedCatalogue) -> PaintOutcome {
        let container = self.entry(&ticket.tag);

        if ticket.seq < container.issued {
            tracing::debug!(
                "Dropping superseded paint of {} ({} < {})",
                ticket.tag,
                ticket.seq,
                container.issued
            );
            return PaintOutcome::Superseded {
                latest: container.issued,
            };
        }

        container.painted = Some(Painted {
            seq: ticket.seq,
            markup: rendered.markup,
            binding: rendered.binding,
        });

        PaintOutcome::Applied
    }

    /// Paint without a prior load: take a fresh ticket and apply it.
    pub fn replace(&mut self, rendered: RenderedCatalogue) -> PaintOutcome {
        let ticket = self.begin(&rendered.tag);
        self.paint(ticket, rendered)
    }

    pub fn container(&self, tag: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.tag == tag)
    }

    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.containers.iter()
    }

    /// A page holding copies of only the containers whose tag is in `tags`,
    /// in page order.
    pub fn select(&self, tags: &[&str]) -> Page {
        Page {
            containers: self
                .containers
                .iter()
                .filter(|c| tags.contains(&c.tag.as_str()))
                .cloned()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Render the page to HTML.
    pub fn render(
        &self,
        templates: &TemplateEngine,
        options: &RenderOptions,
        settings: &PageSettings,
    ) -> Result<String, minijinja::Error> {
        let containers = self
            .containers
            .iter()
            .map(|c| ContainerView {
                id: options.container_id(&c.tag),
                name: c.name.clone(),
                markup: c.painted.as_ref().map(|p| p.markup.to_string()),
                bind: c.painted.as_ref().map(|p| p.binding.script()),
            })
            .collect();

        templates.render_page(&PageContext {
            title: settings.title.clone(),
            accordion: options.container_prefix.clone(),
            containers,
            styles: settings.styles.clone(),
            scripts: settings.scripts.clone(),
            runtime: settings.runtime.clone(),
        })
    }

    fn position(&self, tag: &str) -> Option<usize> {
        self.containers.iter().position(|c| c.tag == tag)
    }

    /// Container for `tag`, declared with the tag as its name if missing.
    fn entry(&mut self, tag: &str) -> &mut Container {
        let i = match self.position(tag) {
            Some(i) => i,
            None => {
                self.add_container(tag, tag);
                self.containers.len() - 1
            }
        };
        &mut self.containers[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Renderer;
    use docshelf_catalogue::{Catalogue, DocumentEntry};

    fn rendered(tag: &str, title: &str) -> RenderedCatalogue {
        let catalogue = Catalogue {
            date: "2021-01".to_string(),
            title: title.to_string(),
            entries: vec![DocumentEntry {
                title: "Guide".to_string(),
                html: Some("guide/index.html".to_string()),
                ..Default::default()
            }],
        };
        Renderer::default().render(&catalogue, "docs", tag, false).unwrap()
    }

    #[test]
    fn repaint_replaces_content() {
        let mut page = Page::new();

        page.replace(rendered("t", "First"));
        page.replace(rendered("t", "Second"));

        let markup = page.container("t").unwrap().markup().unwrap();
        assert!(markup.as_str().contains("Second"));
        assert!(!markup.as_str().contains("First"));
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn superseded_ticket_is_dropped() {
        let mut page = Page::new();

        let slow = page.begin("t");
        let fast = page.begin("t");

        assert_eq!(page.paint(fast, rendered("t", "Newer")), PaintOutcome::Applied);
        assert_eq!(
            page.paint(slow, rendered("t", "Older")),
            PaintOutcome::Superseded { latest: 2 }
        );

        let markup = page.container("t").unwrap().markup().unwrap();
        assert!(markup.as_str().contains("Newer"));
    }

    #[test]
    fn tickets_are_per_tag() {
        let mut page = Page::new();

        let a = page.begin("a");
        let b = page.begin("b");
        let _b2 = page.begin("b");

        assert_eq!(a.seq(), 1);
        assert_eq!(b.seq(), 1);
        assert_eq!(page.paint(a, rendered("a", "A")), PaintOutcome::Applied);
    }

    #[test]
    fn renders_placeholders_and_bind_calls() {
        let mut page = Page::new();
        page.add_container("5_1", "5.1");
        page.add_container("6", "6");
        page.replace(rendered("6", "RTEMS 6"));

        let html = page
            .render(
                &TemplateEngine::new(),
                &RenderOptions::default(),
                &PageSettings {
                    title: "Docs".to_string(),
                    runtime: "assets/shelf.js".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(html.contains("<b>5.1</b> No catalogue found."));
        assert!(html.contains(r#"<div id="rtems-catalogue-6">"#));
        assert!(html.contains(r#"<tr id="RTEMS_6""#));
        assert!(html.contains(r#"docshelf.bind("6", "RTEMS_6", false);"#));
        assert!(!html.contains(r#"docshelf.bind("5_1""#));
    }

    #[test]
    fn keeps_declaration_order() {
        let mut page = Page::new();
        page.add_container("b", "B");
        page.add_container("a", "A");
        page.add_container("b", "Renamed");

        let tags: Vec<_> = page.containers().map(|c| c.tag()).collect();
        assert_eq!(tags, vec!["b", "a"]);
        assert_eq!(page.container("b").unwrap().name(), "Renamed");
    }

    #[test]
    fn selects_painted_containers() {
        let mut page = Page::new();
        page.add_container("5_1", "5.1");
        page.add_container("6", "6");
        page.replace(rendered("6", "RTEMS 6"));

        let latest = page.select(&["6"]);

        assert_eq!(latest.len(), 1);
        assert!(latest.container("5_1").is_none());
        assert!(latest.container("6").unwrap().markup().is_some());
        assert_eq!(page.len(), 2);
    }
}
