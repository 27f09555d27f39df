//! Initialize a catalogue site.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use docshelf_render::write_defaults;

use crate::config::DEFAULT_CONFIG;

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool, templates: Option<PathBuf>) -> Result<()> {
    tracing::info!("Initializing docshelf...");

    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
    } else {
        fs::write(config_path, DEFAULT_CONFIG)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        tracing::info!("Created {}", config_path.display());
    }

    if let Some(dir) = templates {
        if dir.join("page.html").exists() && !yes {
            tracing::warn!("{} already has templates. Use --yes to overwrite.", dir.display());
        } else {
            write_defaults(&dir)
                .with_context(|| format!("Failed to write templates to {}", dir.display()))?;
            tracing::info!("Wrote default templates to {}", dir.display());
            tracing::info!("Set `templates = \"{}\"` under [site] to use them.", dir.display());
        }
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'docshelf dev' to start the development server.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn writes_config_and_templates() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("shelf.toml");
        let templates = temp.path().join("templates");

        run(&config, false, Some(templates.clone())).await.unwrap();

        assert_eq!(fs::read_to_string(&config).unwrap(), DEFAULT_CONFIG);
        assert!(templates.join("catalogue.html").exists());
        assert!(templates.join("page.html").exists());
    }

    #[tokio::test]
    async fn keeps_existing_config_without_yes() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("shelf.toml");
        fs::write(&config, "[site]\ntitle = \"Mine\"\n").unwrap();

        run(&config, false, None).await.unwrap();
        assert!(fs::read_to_string(&config).unwrap().contains("Mine"));

        run(&config, true, None).await.unwrap();
        assert_eq!(fs::read_to_string(&config).unwrap(), DEFAULT_CONFIG);
    }
}
