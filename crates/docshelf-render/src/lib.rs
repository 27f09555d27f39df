//! Catalogue panel rendering and static site generation.
//!
//! Turns parsed catalogues into accordion panel markup, keeps the page
//! those panels are painted into, loads catalogues concurrently, and
//! writes the finished site.

pub mod builder;
pub mod loader;
pub mod page;
pub mod panel;
pub mod render;
pub mod runtime;
pub mod templates;

pub use builder::{
    discover_catalogues, duplicate_tags, BuildConfig, BuildError, BuildResult, CatalogueSource,
    LoadSummary, StaticBuilder, INDEX_PAGE, LATEST_PAGE,
};
pub use loader::{is_remote, FetchError, Fetcher, LoadError, Loader, SourceFetcher};
pub use page::{Container, Page, PageSettings, PaintOutcome, PaintTicket, Painted};
pub use panel::{Chevron, PanelBinding, PanelEffect, PanelState, SCROLL_DURATION};
pub use render::{render_catalogue, Markup, RenderError, RenderOptions, RenderedCatalogue, Renderer};
pub use runtime::runtime_script;
pub use templates::{write_defaults, Row, TemplateEngine};
