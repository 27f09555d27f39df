//! Configuration file (`shelf.toml`).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use docshelf_catalogue::{tag_for, LegacyRelease};
use docshelf_render::{BuildConfig, CatalogueSource, RenderOptions};

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default, rename = "catalogue")]
    pub catalogues: Vec<CatalogueConfig>,
    #[serde(default)]
    pub scan: ScanConfig,
    /// Manual titles for generated legacy catalogues
    #[serde(default)]
    pub titles: BTreeMap<String, String>,
    #[serde(default)]
    pub legacy: Vec<LegacyRelease>,
}

#[derive(Debug, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_container_prefix")]
    pub container_prefix: String,
    /// Directory with template overrides
    pub templates: Option<String>,
    pub pdf_icon: Option<String>,
    pub html_icon: Option<String>,
    /// Stylesheets to link, typically Bootstrap
    #[serde(default)]
    pub styles: Vec<String>,
    /// Scripts to load before the panel runtime, typically jQuery and Bootstrap
    #[serde(default)]
    pub scripts: Vec<String>,
    /// Name of the latest release, given its own page
    pub latest: Option<String>,
    /// Directory generated legacy catalogues are written to
    #[serde(default = "default_legacy_dir")]
    pub legacy_dir: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            output: default_output(),
            base_url: default_base_url(),
            container_prefix: default_container_prefix(),
            templates: None,
            pdf_icon: None,
            html_icon: None,
            styles: vec![],
            scripts: vec![],
            latest: None,
            legacy_dir: default_legacy_dir(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogueConfig {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub path: String,
    /// Defaults to the name with unsafe characters replaced
    pub tag: Option<String>,
    #[serde(default)]
    pub show: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct ScanConfig {
    pub dir: Option<String>,
}

fn default_title() -> String {
    "Documentation".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_base_url() -> String {
    "/".to_string()
}
fn default_container_prefix() -> String {
    RenderOptions::default().container_prefix
}
fn default_legacy_dir() -> String {
    "releases".to_string()
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("No {} found, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());

    Ok(config)
}

impl ConfigFile {
    /// Build settings for a site rooted at `base_dir`.
    pub fn into_build_config(self, base_dir: &Path) -> BuildConfig {
        let defaults = RenderOptions::default();
        let site = self.site;

        let mut catalogues: Vec<CatalogueSource> = self
            .catalogues
            .into_iter()
            .map(|c| CatalogueSource {
                tag: c.tag.unwrap_or_else(|| tag_for(&c.name)),
                name: c.name,
                url: c.url,
                path: c.path,
                show: c.show,
            })
            .collect();

        // Generated legacy catalogues link relative to their directory
        catalogues.extend(self.legacy.iter().map(|release| {
            CatalogueSource::new(
                &release.name,
                format!("{}/{}.xml", site.legacy_dir, release.name),
                &site.legacy_dir,
            )
        }));

        BuildConfig {
            base_dir: base_dir.to_path_buf(),
            output_dir: base_dir.join(&site.output),
            base_url: site.base_url,
            title: site.title,
            catalogues,
            scan_dir: self.scan.dir.map(PathBuf::from),
            templates_dir: site.templates.map(PathBuf::from),
            render: RenderOptions {
                container_prefix: site.container_prefix,
                pdf_icon: site.pdf_icon.unwrap_or(defaults.pdf_icon),
                html_icon: site.html_icon.unwrap_or(defaults.html_icon),
                icon_size: defaults.icon_size,
            },
            styles: site.styles,
            scripts: site.scripts,
            latest: site.latest,
        }
    }
}

/// Where the descriptor of a legacy release is written.
pub fn legacy_file(base_dir: &Path, legacy_dir: &str, release: &LegacyRelease) -> PathBuf {
    base_dir.join(legacy_dir).join(format!("{}.xml", release.name))
}

/// Directory the config file lives in; paths in it are relative to this.
pub fn config_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

pub const DEFAULT_CONFIG: &str = r#"# docshelf configuration

[site]
title = "Documentation"
output = "dist"
base_url = "/"
container_prefix = "rtems-catalogue"
styles = ["https://maxcdn.bootstrapcdn.com/bootstrap/3.3.7/css/bootstrap.min.css"]
scripts = [
    "https://code.jquery.com/jquery-3.2.1.min.js",
    "https://maxcdn.bootstrapcdn.com/bootstrap/3.3.7/js/bootstrap.min.js",
]

# Catalogues listed here come first, in order.
# [[catalogue]]
# name = "5.1"
# url = "releases/5.1/catalogue.xml"
# path = "releases/5.1"
# show = true

# Every catalogue.xml below this directory gets its own panel.
[scan]
dir = "releases"

# Releases older than published catalogues. `docshelf catalogues` writes
# releases/<name>.xml for each one, and each gets a panel.
# [titles]
# c_user = "RTEMS C User Guide"
#
# [[legacy]]
# name = "4.10.2"
# date = "21st Jan 2017"
# html = "4.10.2/html"
# pdf = "4.10.2/pdf"
# index_per_doc = true
# manuals = ["c_user"]
"#;
