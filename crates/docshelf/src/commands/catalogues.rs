//! Generate catalogue descriptors for legacy releases.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use docshelf_catalogue::write_catalogue;

use crate::config::{config_dir, legacy_file, load_config, ConfigFile};

/// Run the catalogues command.
pub async fn run(config_path: &Path, output: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let base_dir = config_dir(config_path);

    if config.legacy.is_empty() {
        tracing::warn!("No [[legacy]] releases in {}", config_path.display());
        return Ok(());
    }

    let written = write_legacy(&config, &base_dir, output.as_deref())?;
    for path in &written {
        tracing::info!("Wrote {}", path.display());
    }
    tracing::info!("Generated {} legacy catalogues", written.len());

    Ok(())
}

/// Write one descriptor per legacy release. Files go to `output` when given,
/// otherwise to the configured legacy directory under `base_dir`.
fn write_legacy(config: &ConfigFile, base_dir: &Path, output: Option<&Path>) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for release in &config.legacy {
        let catalogue = release.catalogue(&config.titles)?;
        let xml = write_catalogue(&catalogue)?;

        let path = match output {
            Some(dir) => dir.join(format!("{}.xml", release.name)),
            None => legacy_file(base_dir, &config.site.legacy_dir, release),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, xml).with_context(|| format!("Failed to write {}", path.display()))?;

        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docshelf_catalogue::parse_catalogue;
    use docshelf_render::StaticBuilder;
    use tempfile::tempdir;

    const CONFIG: &str = r#"
        [titles]
        c_user = "RTEMS C User Guide"
        bsp_howto = "RTEMS BSP and Device Driver Development Guide"

        [[legacy]]
        name = "4.10.2"
        date = "21st Jan 2017"
        html = "4.10.2/html"
        pdf = "4.10.2/pdf"
        index_per_doc = true
        manuals = ["c_user", "bsp_howto"]
    "#;

    #[tokio::test]
    async fn writes_descriptors_that_build() {
        let temp = tempdir().unwrap();
        let site = temp.path();
        let config: ConfigFile = toml::from_str(CONFIG).unwrap();

        let written = write_legacy(&config, site, None).unwrap();

        assert_eq!(written, vec![site.join("releases/4.10.2.xml")]);
        let catalogue = parse_catalogue(&fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(catalogue.title, "4.10.2");
        assert_eq!(catalogue.entries.len(), 2);
        assert!(catalogue.entries.iter().all(|e| e.legacy));

        let result = StaticBuilder::new(config.into_build_config(site))
            .build()
            .await
            .unwrap();
        assert_eq!(result.painted, 1);

        let html = fs::read_to_string(site.join("dist/index.html")).unwrap();
        assert!(html.contains(r#"href="releases/4.10.2/html/c_user/index.html""#));
        assert!(html.contains(r#"href="releases/4.10.2/pdf/bsp_howto.pdf""#));
    }

    #[test]
    fn missing_title_stops_generation() {
        let temp = tempdir().unwrap();
        let config: ConfigFile =
            toml::from_str(&CONFIG.replace(r#"bsp_howto = "RTEMS BSP and Device Driver Development Guide""#, ""))
                .unwrap();

        let result = write_legacy(&config, temp.path(), Some(&temp.path().join("out")));

        assert!(result.is_err());
        assert!(!temp.path().join("out/4.10.2.xml").exists());
    }
}
