//! docshelf CLI - documentation catalogue pages.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "docshelf")]
#[command(about = "Render documentation catalogues into accordion pages")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to shelf.toml config file
    #[arg(short, long, default_value = "shelf.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,

        /// Also write the built-in templates to this directory
        #[arg(long)]
        templates: Option<PathBuf>,
    },

    /// Render one catalogue panel to stdout
    Render {
        /// Catalogue XML file or URL, `-` for stdin
        xml: String,

        /// Base path of document links
        #[arg(short, long, default_value = "")]
        path: String,

        /// Container tag
        #[arg(short, long, default_value = "catalogue")]
        tag: String,

        /// Open the panel once bound
        #[arg(long)]
        show: bool,
    },

    /// Write catalogue XML for legacy releases
    Catalogues {
        /// Output directory (defaults to the configured legacy directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build static catalogue page
    Build {
        /// Output directory (defaults to config or "dist")
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start development server with live repaints
    Dev {
        /// Port to listen on
        #[arg(short, long, default_value = "7777")]
        port: u16,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Preview built site
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve (defaults to the configured output)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `render` output stays clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { yes, templates } => {
            commands::init::run(&cli.config, yes, templates).await?;
        }
        Commands::Render {
            xml,
            path,
            tag,
            show,
        } => {
            commands::render::run(&cli.config, &xml, &path, &tag, show).await?;
        }
        Commands::Catalogues { output } => {
            commands::catalogues::run(&cli.config, output).await?;
        }
        Commands::Build { output } => {
            commands::build::run(&cli.config, output).await?;
        }
        Commands::Dev { port, no_open } => {
            commands::dev::run(&cli.config, port, !no_open).await?;
        }
        Commands::Serve { port, dir, no_open } => {
            commands::serve::run(&cli.config, port, dir, !no_open).await?;
        }
    }

    Ok(())
}
