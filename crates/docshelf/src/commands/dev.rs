//! Development server command.

use std::path::Path;

use anyhow::Result;
use docshelf_server::{DevServer, DevServerConfig};

use crate::config::{config_dir, load_config};

/// Run the dev server.
pub async fn run(config_path: &Path, port: u16, open: bool) -> Result<()> {
    tracing::info!("Starting development server on port {}", port);

    let build = load_config(config_path)?.into_build_config(&config_dir(config_path));

    let config = DevServerConfig {
        build,
        port,
        open,
        ..Default::default()
    };

    DevServer::new(config).start().await?;

    Ok(())
}
