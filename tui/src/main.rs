//! Catalog TUI Entry Point
//!
//! Usage:
//!   catalog-tui [OPTIONS]
//!
//! Options:
//!   --config <FILE>        Config file (default: ~/.config/coffee-catalog/catalog.toml)
//!   --local                Browse in this terminal
//!   --serve                Serve one session per TCP connection (default)
//!   --listen <ADDR>        Served mode listen address
//!   --source-url <URL>     Catalog endpoint to fetch from
//!   --catalog <FILE>       JSON catalog for the embedded service
//!   --no-embedded-service  Do not start the in-process catalog service
//!
//! Logs go to stderr in served mode and to
//! `~/.cache/coffee-catalog/catalog-tui.log` in local mode.

use std::fs::{self, OpenOptions};
use std::io::{self, IsTerminal};
use std::net::SocketAddr;
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::EventStream;
use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_core::config::load_config_from_path;
use catalog_core::{CatalogConfig, ConfigOverrides, HttpRepository, RunMode, Viewport};
use catalog_daemon::{load_catalog_file, seed_catalog, CatalogService, ServiceHandle};
use catalog_tui::serve::{self, ServeSettings, SessionServer};
use catalog_tui::{App, Theme};

const LOG_FILE_NAME: &str = "catalog-tui.log";

/// Catalog TUI - browse the coffee catalog in a terminal
#[derive(Parser, Debug)]
#[command(name = "catalog-tui")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Browse in this terminal
    #[arg(long, conflicts_with = "serve")]
    local: bool,

    /// Serve one session per TCP connection
    #[arg(long)]
    serve: bool,

    /// Served mode listen address
    #[arg(short, long, value_name = "ADDR")]
    listen: Option<SocketAddr>,

    /// Catalog endpoint to fetch from
    #[arg(long, value_name = "URL")]
    source_url: Option<String>,

    /// JSON catalog for the embedded service
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Do not start the in-process catalog service
    #[arg(long)]
    no_embedded_service: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if self.local {
            overrides = overrides.with_mode(RunMode::Local);
        } else if self.serve {
            overrides = overrides.with_mode(RunMode::Served);
        }
        if let Some(addr) = self.listen {
            overrides = overrides.with_serve_listen(addr);
        }
        if let Some(url) = &self.source_url {
            overrides = overrides.with_source_url(url.clone());
        }
        if let Some(path) = &self.catalog {
            overrides = overrides.with_catalog_file(path.clone());
        }
        if self.no_embedded_service {
            overrides = overrides.with_service_embedded(false);
        }
        overrides
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config_from_path(args.config.clone()).context("Failed to load config")?;
    args.overrides().apply(&mut config);
    config.validate().context("Invalid configuration")?;

    // Local mode needs a TTY; check before touching the terminal
    if config.mode == RunMode::Local && (!io::stdin().is_terminal() || !io::stdout().is_terminal())
    {
        eprintln!("Error: catalog-tui --local requires a terminal (TTY)");
        eprintln!();
        eprintln!("Run it interactively, or use served mode and connect with");
        eprintln!("  telnet <host> <port>");
        std::process::exit(1);
    }

    init_logging(config.mode);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(run(config))
}

/// Install the tracing subscriber. Local mode logs to a file so the screen
/// stays clean.
fn init_logging(mode: RunMode) {
    let writer = match mode {
        RunMode::Served => BoxMakeWriter::new(io::stderr),
        RunMode::Local => match open_log_file() {
            Some(file) => BoxMakeWriter::new(Mutex::new(file)),
            None => BoxMakeWriter::new(io::sink),
        },
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(mode == RunMode::Served)
                .with_writer(writer),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

fn open_log_file() -> Option<fs::File> {
    let dir = dirs::cache_dir()?.join("coffee-catalog");
    fs::create_dir_all(&dir).ok()?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE_NAME))
        .ok()
}

async fn run(mut config: CatalogConfig) -> Result<()> {
    info!(mode = ?config.mode, source = ?config.source(), "Starting Catalog TUI");

    let service = start_embedded_service(&mut config).await?;

    let repository = Arc::new(
        HttpRepository::new(&config.source_url, config.fetch_timeout)
            .context("Failed to build HTTP client")?,
    );
    info!(url = %repository.url(), "Catalog source");

    let result = match config.mode {
        RunMode::Local => run_local(repository, &config).await,
        RunMode::Served => run_served(repository, &config).await,
    };

    if let Some(handle) = service {
        handle.stop().await;
    }
    result
}

/// Start the in-process catalog service when configured
///
/// When the source URL still points at the default service address, it is
/// rewritten to the address actually bound.
async fn start_embedded_service(config: &mut CatalogConfig) -> Result<Option<ServiceHandle>> {
    if !config.service_embedded {
        return Ok(None);
    }

    let items = match &config.catalog_file {
        Some(path) => load_catalog_file(path)
            .await
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => seed_catalog(),
    };

    let handle = CatalogService::new(items)
        .start(config.service_listen)
        .await
        .context("Failed to start embedded catalog service")?;

    if config.source_url == CatalogConfig::default().source_url {
        config.source_url = handle.products_url();
    }
    info!(url = %handle.products_url(), "Embedded catalog service ready");
    Ok(Some(handle))
}

async fn run_local(repository: Arc<HttpRepository>, config: &CatalogConfig) -> Result<()> {
    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let size = terminal.size()?;
    let mut app = App::new(
        repository,
        config.fetch_timeout,
        config.tick_interval,
        Viewport::new(size.width, size.height),
        Theme::default(),
    );
    let mut events = EventStream::new();
    let result = app.run(&mut terminal, &mut events).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_served(repository: Arc<HttpRepository>, config: &CatalogConfig) -> Result<()> {
    let settings = ServeSettings::from_config(config);
    let listener = serve::bind(settings.listen).await?;
    let server = SessionServer::new(repository, settings, Theme::default());

    server
        .serve(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!("Session server stopped");
    Ok(())
}
