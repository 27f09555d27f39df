//! Render a single catalogue panel.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;

use docshelf_render::{BuildConfig, Loader, Page, SourceFetcher, StaticBuilder};

use crate::config::{config_dir, load_config};

/// Run the render command.
pub async fn run(config_path: &Path, xml: &str, path: &str, tag: &str, show: bool) -> Result<()> {
    let config = load_config(config_path)?.into_build_config(&config_dir(config_path));
    let html = render_panel(config, xml, path, tag, show).await?;
    println!("{}", html);
    Ok(())
}

/// Render the catalogue at `source` followed by the script that binds it.
async fn render_panel(
    config: BuildConfig,
    source: &str,
    path: &str,
    tag: &str,
    show: bool,
) -> Result<String> {
    let builder = StaticBuilder::new(config);
    let fetcher = SourceFetcher::new(".")?;
    let page = Arc::new(RwLock::new(Page::new()));
    let loader = Loader::new(fetcher, Arc::clone(builder.renderer()), page);

    if source == "-" {
        let mut xml = String::new();
        tokio::io::stdin()
            .read_to_string(&mut xml)
            .await
            .context("Failed to read catalogue from stdin")?;
        loader.paint_catalogue(&xml, path, tag, show).await?;
    } else {
        loader
            .load_catalogue(source, path, tag, show)
            .await
            .with_context(|| format!("Failed to render {}", source))?;
    }

    let page = loader.page().read().await;
    let painted = page
        .container(tag)
        .and_then(|c| c.painted())
        .context("Catalogue was not painted")?;

    Ok(format!(
        "{}\n<script>{}</script>",
        painted.markup,
        painted.binding.script()
    ))
}
