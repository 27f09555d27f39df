//! Preview server command.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::Router;
use tower_http::services::ServeDir;

use crate::config::{config_dir, load_config};

/// Run the serve command.
pub async fn run(config_path: &Path, port: u16, dir: Option<PathBuf>, open: bool) -> Result<()> {
    let site_root = config_dir(config_path);
    let dir = match dir {
        Some(dir) => dir,
        None => load_config(config_path)?
            .into_build_config(&site_root)
            .output_dir,
    };

    if !dir.join("index.html").exists() {
        anyhow::bail!(
            "No catalogue page in {}. Run 'docshelf build' first.",
            dir.display()
        );
    }

    let addr: SocketAddr = format!("127.0.0.1:{}", port)
        .parse()
        .context("Invalid address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!(
        "Serving {} (documents from {}) at http://{}",
        dir.display(),
        site_root.display(),
        addr
    );

    if open {
        let _ = open::that(format!("http://{}", addr));
    }

    axum::serve(listener, preview_router(&dir, &site_root)).await?;

    Ok(())
}

/// Serve the built pages, and everything else from the site root so the
/// document links and icons of the catalogues resolve.
fn preview_router(dir: &Path, site_root: &Path) -> Router {
    Router::new().fallback_service(ServeDir::new(dir).fallback(ServeDir::new(site_root)))
}
