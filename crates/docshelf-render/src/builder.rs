//! Static site builder.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use tokio::task::JoinSet;
use walkdir::WalkDir;

use docshelf_catalogue::{join_link, tag_for};

use crate::loader::{is_remote, Fetcher, Loader, SourceFetcher};
use crate::page::{Page, PageSettings, PaintOutcome};
use crate::render::{RenderOptions, Renderer};
use crate::runtime::runtime_script;

/// File name of catalogues found by scanning a directory.
pub const CATALOGUE_FILE: &str = "catalogue.xml";

/// Page listing every catalogue.
pub const INDEX_PAGE: &str = "index.html";

/// Page showing only the latest release.
pub const LATEST_PAGE: &str = "latest.html";

/// A catalogue to place on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueSource {
    /// Display name, shown while no catalogue is painted
    pub name: String,

    /// Where to fetch the catalogue XML from
    pub url: String,

    /// Base path of the catalogue's document links
    pub path: String,

    /// Container tag
    pub tag: String,

    /// Open the panel once painted
    pub show: bool,
}

impl CatalogueSource {
    /// Create a source whose tag is derived from its name.
    pub fn new(name: impl Into<String>, url: impl Into<String>, path: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            tag: tag_for(&name),
            name,
            url: url.into(),
            path: path.into(),
            show: false,
        }
    }

    /// Local file backing this source, if it is not fetched over the network.
    pub fn local_path(&self, base_dir: &Path) -> Option<PathBuf> {
        if is_remote(&self.url) {
            None
        } else {
            Some(base_dir.join(&self.url))
        }
    }
}

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Site root; local catalogue URLs and the scan directory are relative to it
    pub base_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Base URL the site is served under
    pub base_url: String,

    /// Page title
    pub title: String,

    /// Catalogues listed explicitly, in page order
    pub catalogues: Vec<CatalogueSource>,

    /// Directory (under `base_dir`) scanned for `catalogue.xml` files
    pub scan_dir: Option<PathBuf>,

    /// Directory with template overrides
    pub templates_dir: Option<PathBuf>,

    /// Panel rendering options
    pub render: RenderOptions,

    /// Stylesheets to link
    pub styles: Vec<String>,

    /// Scripts providing the collapse framework
    pub scripts: Vec<String>,

    /// Name of the latest release; when set, a page with only its
    /// catalogue is written next to the index
    pub latest: Option<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            output_dir: PathBuf::from("dist"),
            base_url: "/".to_string(),
            title: "Documentation".to_string(),
            catalogues: vec![],
            scan_dir: None,
            templates_dir: None,
            render: RenderOptions::default(),
            styles: vec![],
            scripts: vec![],
            latest: None,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of catalogues on the page
    pub catalogues: usize,

    /// Number of catalogues painted
    pub painted: usize,

    /// Number of catalogues that failed to load
    pub failed: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Counts from loading every catalogue of a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub painted: usize,
    pub failed: usize,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read: {0}")]
    ReadError(String),

    #[error("Failed to create fetcher: {0}")]
    FetchError(String),

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error("Latest release {0} is not one of the catalogues")]
    UnknownLatest(String),
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    renderer: Arc<Renderer>,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Self {
        let templates_dir = config
            .templates_dir
            .as_ref()
            .map(|dir| config.base_dir.join(dir));
        let renderer = Renderer::with_templates(config.render.clone(), templates_dir);

        Self {
            config,
            renderer: Arc::new(renderer),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn renderer(&self) -> &Arc<Renderer> {
        &self.renderer
    }

    /// All catalogues of the page: configured ones first, then scanned ones.
    pub fn sources(&self) -> Result<Vec<CatalogueSource>, BuildError> {
        let mut sources = self.config.catalogues.clone();

        if let Some(dir) = &self.config.scan_dir {
            let scanned = discover_catalogues(&self.config.base_dir, dir)?;
            tracing::info!("Found {} catalogues under {}", scanned.len(), dir.display());
            sources.extend(scanned);
        }

        for tag in duplicate_tags(&sources) {
            tracing::warn!(
                "Several catalogues share the container tag {}; only one will be shown",
                tag
            );
        }

        Ok(sources)
    }

    /// Container tag of the latest release, if one is configured.
    pub fn latest_tag(&self) -> Option<String> {
        self.config.latest.as_deref().map(tag_for)
    }

    /// A page with one placeholder container per source.
    pub fn page_for(sources: &[CatalogueSource]) -> Page {
        let mut page = Page::new();
        for source in sources {
            page.add_container(&source.tag, &source.name);
        }
        page
    }

    /// Load every source concurrently. Failures are logged and counted.
    pub async fn load_all<F>(loader: &Loader<F>, sources: &[CatalogueSource]) -> LoadSummary
    where
        F: Fetcher + 'static,
    {
        let mut tasks = JoinSet::new();

        for source in sources.iter().cloned() {
            let loader = loader.clone();
            tasks.spawn(async move {
                loader
                    .load_catalogue(&source.url, &source.path, &source.tag, source.show)
                    .await
            });
        }

        let mut summary = LoadSummary::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(PaintOutcome::Applied)) => summary.painted += 1,
                Ok(Ok(PaintOutcome::Superseded { .. })) => {}
                Ok(Err(_)) => summary.failed += 1,
                Err(e) => {
                    tracing::warn!("Catalogue load task failed: {}", e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Page settings for a page whose runtime script is at `runtime`.
    pub fn page_settings(&self, runtime: String) -> PageSettings {
        PageSettings {
            title: self.config.title.clone(),
            styles: self.config.styles.clone(),
            scripts: self.config.scripts.clone(),
            runtime,
        }
    }

    /// Build the static site.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let fetcher = SourceFetcher::new(&self.config.base_dir)
            .map_err(|e| BuildError::FetchError(e.to_string()))?;
        self.build_with(fetcher).await
    }

    /// Build the static site, fetching catalogues with `fetcher`.
    pub async fn build_with<F>(&self, fetcher: F) -> Result<BuildResult, BuildError>
    where
        F: Fetcher + 'static,
    {
        let start = Instant::now();

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let sources = self.sources()?;
        let page = Arc::new(RwLock::new(Self::page_for(&sources)));
        let loader = Loader::new(fetcher, Arc::clone(&self.renderer), Arc::clone(&page));

        let summary = Self::load_all(&loader, &sources).await;

        let settings = self.page_settings(join_link(&self.config.base_url, "assets/shelf.js"));
        let page = page.read().await;
        self.write_page(&page, INDEX_PAGE, &settings)?;

        if let Some(tag) = self.latest_tag() {
            if page.container(&tag).is_none() {
                return Err(BuildError::UnknownLatest(
                    self.config.latest.clone().unwrap_or_default(),
                ));
            }
            self.write_page(&page.select(&[tag.as_str()]), LATEST_PAGE, &settings)?;
        }

        self.generate_assets()?;

        Ok(BuildResult {
            catalogues: sources.len(),
            painted: summary.painted,
            failed: summary.failed,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    fn write_page(&self, page: &Page, file: &str, settings: &PageSettings) -> Result<(), BuildError> {
        let html = page
            .render(
                self.renderer.templates(),
                self.renderer.options(),
                settings,
            )
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;

        fs::write(self.config.output_dir.join(file), html)
            .map_err(|e| BuildError::WriteError(e.to_string()))
    }

    /// Write the panel runtime.
    fn generate_assets(&self) -> Result<(), BuildError> {
        let assets_dir = self.config.output_dir.join("assets");
        fs::create_dir_all(&assets_dir).map_err(|e| BuildError::WriteError(e.to_string()))?;

        let js = runtime_script(&self.config.render.container_prefix, None);
        fs::write(assets_dir.join("shelf.js"), js)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        Ok(())
    }
}

/// Find `catalogue.xml` files under `base_dir/dir`.
///
/// Each catalogue is named after its directory relative to `dir`, and its
/// links are relative to that directory. Results are sorted by name.
pub fn discover_catalogues(base_dir: &Path, dir: &Path) -> Result<Vec<CatalogueSource>, BuildError> {
    let root = base_dir.join(dir);
    if !root.exists() {
        return Err(BuildError::ReadError(format!(
            "Catalogue directory not found: {}",
            root.display()
        )));
    }

    let mut sources = Vec::new();

    for entry in WalkDir::new(&root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || path.file_name().and_then(|n| n.to_str()) != Some(CATALOGUE_FILE) {
            continue;
        }

        let Some(parent) = path.parent() else {
            continue;
        };
        let relative = parent.strip_prefix(&root).unwrap_or(parent);
        let name = url_path(relative);
        if name.is_empty() {
            tracing::warn!("Ignoring {} at the top of the scan directory", path.display());
            continue;
        }

        let link_dir = url_path(&dir.join(relative));
        sources.push(CatalogueSource::new(
            name,
            format!("{}/{}", link_dir, CATALOGUE_FILE),
            link_dir,
        ));
    }

    Ok(sources)
}

/// Tags claimed by more than one source, in first-seen order.
pub fn duplicate_tags(sources: &[CatalogueSource]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();

    for source in sources {
        if !seen.insert(source.tag.as_str()) && !duplicates.contains(&source.tag) {
            duplicates.push(source.tag.clone());
        }
    }

    duplicates
}

/// Render a relative path with `/` separators.
fn url_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
