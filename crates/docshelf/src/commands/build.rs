//! Static site build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use docshelf_render::StaticBuilder;

use crate::config::{config_dir, load_config};

/// Run the build command.
pub async fn run(config_path: &Path, output: Option<PathBuf>) -> Result<()> {
    tracing::info!("Building catalogue page...");

    let mut config = load_config(config_path)?.into_build_config(&config_dir(config_path));
    if let Some(output) = output {
        config.output_dir = output;
    }

    let result = StaticBuilder::new(config).build().await?;

    tracing::info!(
        "Painted {} of {} catalogues in {}ms",
        result.painted,
        result.catalogues,
        result.duration_ms
    );

    if result.failed > 0 {
        tracing::warn!(
            "{} catalogues failed to load and show a placeholder",
            result.failed
        );
    }

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
