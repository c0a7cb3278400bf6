//! Catalog Daemon - standalone catalog service
//!
//! # Usage
//!
//! ```bash
//! # Serve the built-in menu on the default address
//! catalog-daemon
//!
//! # Serve a custom catalog
//! catalog-daemon --listen 0.0.0.0:9991 --catalog /srv/coffee/catalog.json
//!
//! # Verbose logging
//! RUST_LOG=debug catalog-daemon
//! ```
//!
//! # Signals
//!
//! - `SIGINT`: Graceful shutdown

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use catalog_daemon::{load_catalog_file, seed_catalog, CatalogService};

/// Catalog Daemon - serves the coffee catalog over HTTP
#[derive(Parser, Debug)]
#[command(name = "catalog-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to listen on
    #[arg(short = 'l', long, env = "CATALOG_SERVICE_LISTEN", default_value = "127.0.0.1:9991")]
    listen: SocketAddr,

    /// JSON catalog to serve instead of the built-in menu
    #[arg(short = 'c', long, env = "CATALOG_FILE", value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CATALOG_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "catalog_daemon={level},catalog_core={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!("Starting Catalog Daemon");

    let items = match &args.catalog {
        Some(path) => load_catalog_file(path)
            .await
            .context("Failed to load catalog")?,
        None => seed_catalog(),
    };

    let handle = CatalogService::new(items).start(args.listen).await?;
    info!(url = %handle.products_url(), "Ready");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    info!("Shutdown signal received");
    handle.stop().await;
    Ok(())
}
