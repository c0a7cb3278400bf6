//! TOML Configuration File Support
//!
//! Configuration for the catalog browser lives in a TOML file at
//! `~/.config/coffee-catalog/catalog.toml`.
//!
//! # Configuration Priority
//!
//! Values are loaded with the following priority (highest first):
//! 1. CLI arguments (see [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [source]
//! url = "http://localhost:9991/products"
//! timeout_ms = 5000
//!
//! [service]
//! embedded = true
//! listen = "127.0.0.1:9991"
//! catalog_file = "/srv/coffee/catalog.json"
//!
//! [server]
//! listen = "0.0.0.0:2222"
//! max_sessions = 64
//! default_width = 80
//! default_height = 24
//!
//! [ui]
//! mode = "local"
//! tick_ms = 100
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::Viewport;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where the configuration came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// Run Mode
// =============================================================================

/// How the terminal surface is hosted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// One session on the controlling terminal
    Local,
    /// One session per network connection
    #[default]
    Served,
}

impl std::str::FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "served" | "serve" | "server" => Ok(Self::Served),
            other => Err(ConfigError::ValidationError(format!(
                "unknown mode '{other}' (expected 'local' or 'served')"
            ))),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[source]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceToml {
    /// Catalog endpoint
    pub url: Option<String>,
    /// Fetch timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

/// `[service]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceToml {
    /// Start the catalog service in-process
    pub embedded: Option<bool>,
    /// Listen address for the embedded service
    pub listen: Option<String>,
    /// JSON catalog to serve instead of the built-in menu
    pub catalog_file: Option<PathBuf>,
}

/// `[server]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerToml {
    /// Listen address for served mode
    pub listen: Option<String>,
    /// Concurrent session limit
    pub max_sessions: Option<usize>,
    /// Viewport assumed until the client reports its size
    pub default_width: Option<u16>,
    pub default_height: Option<u16>,
}

/// `[ui]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiToml {
    pub mode: Option<RunMode>,
    /// Animation tick in milliseconds
    pub tick_ms: Option<u64>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogToml {
    pub source: SourceToml,
    pub service: ServiceToml,
    pub server: ServerToml,
    pub ui: UiToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved configuration for the catalog browser
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    /// Catalog endpoint the sessions fetch from
    pub source_url: String,

    /// Per-fetch timeout
    pub fetch_timeout: Duration,

    /// Whether to run the catalog service in-process
    pub service_embedded: bool,

    /// Listen address of the embedded catalog service
    pub service_listen: SocketAddr,

    /// Catalog JSON served by the embedded service (built-in menu if `None`)
    pub catalog_file: Option<PathBuf>,

    /// Listen address for served mode
    pub serve_listen: SocketAddr,

    /// Concurrent session limit in served mode
    pub max_sessions: usize,

    /// Viewport assumed before a served client reports its size
    pub default_viewport: Viewport,

    /// Animation tick
    pub tick_interval: Duration,

    pub mode: RunMode,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source_url: "http://localhost:9991/products".to_string(),
            fetch_timeout: Duration::from_secs(5),
            service_embedded: true,
            service_listen: SocketAddr::from(([127, 0, 0, 1], 9991)),
            catalog_file: None,
            serve_listen: SocketAddr::from(([0, 0, 0, 0], 2222)),
            max_sessions: 64,
            default_viewport: Viewport::default(),
            tick_interval: Duration::from_millis(100),
            mode: RunMode::default(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl CatalogConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Reject values the runtime cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "fetch timeout must be greater than zero".to_string(),
            ));
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "tick interval must be greater than zero".to_string(),
            ));
        }
        if self.max_sessions == 0 {
            return Err(ConfigError::ValidationError(
                "max_sessions must be at least 1".to_string(),
            ));
        }
        if self.source_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "source url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/coffee-catalog/catalog.toml` or
/// `~/.config/coffee-catalog/catalog.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("coffee-catalog").join("catalog.toml"))
}

/// Load configuration from the default path, then the environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<CatalogConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path, then the environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<CatalogConfig, ConfigError> {
    let mut config = load_file_config(path)?;
    apply_env_config(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Defaults plus the TOML file, without environment overrides
fn load_file_config(path: Option<PathBuf>) -> Result<CatalogConfig, ConfigError> {
    let mut config = CatalogConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: CatalogToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    Ok(config)
}

fn parse_addr(field: &str, value: &str) -> Result<SocketAddr, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::ValidationError(format!("{field}: invalid address '{value}'")))
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut CatalogConfig, toml: &CatalogToml) -> Result<(), ConfigError> {
    // Source
    if let Some(ref url) = toml.source.url {
        config.source_url = url.clone();
    }
    if let Some(ms) = toml.source.timeout_ms {
        config.fetch_timeout = Duration::from_millis(ms);
    }

    // Service
    if let Some(embedded) = toml.service.embedded {
        config.service_embedded = embedded;
    }
    if let Some(ref listen) = toml.service.listen {
        config.service_listen = parse_addr("service.listen", listen)?;
    }
    if toml.service.catalog_file.is_some() {
        config.catalog_file = toml.service.catalog_file.clone();
    }

    // Server
    if let Some(ref listen) = toml.server.listen {
        config.serve_listen = parse_addr("server.listen", listen)?;
    }
    if let Some(max) = toml.server.max_sessions {
        config.max_sessions = max;
    }
    if let Some(width) = toml.server.default_width {
        config.default_viewport.width = width;
    }
    if let Some(height) = toml.server.default_height {
        config.default_viewport.height = height;
    }

    // UI
    if let Some(mode) = toml.ui.mode {
        config.mode = mode;
    }
    if let Some(ms) = toml.ui.tick_ms {
        config.tick_interval = Duration::from_millis(ms);
    }

    Ok(())
}

/// Apply environment variable overrides to the config
///
/// Unparsable values are logged and ignored.
fn apply_env_config<F>(config: &mut CatalogConfig, var: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = var("CATALOG_SOURCE_URL") {
        config.source_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = var("CATALOG_FETCH_TIMEOUT_MS") {
        if let Ok(ms) = timeout.parse::<u64>() {
            config.fetch_timeout = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(embedded) = var("CATALOG_SERVICE_EMBEDDED") {
        config.service_embedded = embedded != "0" && embedded.to_lowercase() != "false";
        config.source = ConfigSource::Env;
    }
    if let Some(listen) = var("CATALOG_SERVICE_LISTEN") {
        match listen.parse() {
            Ok(addr) => {
                config.service_listen = addr;
                config.source = ConfigSource::Env;
            }
            Err(_) => tracing::warn!(value = %listen, "Ignoring invalid CATALOG_SERVICE_LISTEN"),
        }
    }
    if let Some(path) = var("CATALOG_FILE") {
        config.catalog_file = Some(PathBuf::from(path));
        config.source = ConfigSource::Env;
    }
    if let Some(listen) = var("CATALOG_SERVE_LISTEN") {
        match listen.parse() {
            Ok(addr) => {
                config.serve_listen = addr;
                config.source = ConfigSource::Env;
            }
            Err(_) => tracing::warn!(value = %listen, "Ignoring invalid CATALOG_SERVE_LISTEN"),
        }
    }
    if let Some(max) = var("CATALOG_MAX_SESSIONS") {
        if let Ok(n) = max.parse::<usize>() {
            config.max_sessions = n;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(tick) = var("CATALOG_TICK_MS") {
        if let Ok(ms) = tick.parse::<u64>() {
            config.tick_interval = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(mode) = var("CATALOG_TUI_MODE") {
        match mode.parse::<RunMode>() {
            Ok(mode) => {
                config.mode = mode;
                config.source = ConfigSource::Env;
            }
            Err(e) => tracing::warn!(error = %e, "Ignoring invalid CATALOG_TUI_MODE"),
        }
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub source_url: Option<String>,
    pub mode: Option<RunMode>,
    pub serve_listen: Option<SocketAddr>,
    pub service_embedded: Option<bool>,
    pub catalog_file: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn with_serve_listen(mut self, addr: SocketAddr) -> Self {
        self.serve_listen = Some(addr);
        self
    }

    #[must_use]
    pub fn with_service_embedded(mut self, embedded: bool) -> Self {
        self.service_embedded = Some(embedded);
        self
    }

    #[must_use]
    pub fn with_catalog_file(mut self, path: PathBuf) -> Self {
        self.catalog_file = Some(path);
        self
    }

    fn is_empty(&self) -> bool {
        self.source_url.is_none()
            && self.mode.is_none()
            && self.serve_listen.is_none()
            && self.service_embedded.is_none()
            && self.catalog_file.is_none()
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut CatalogConfig) {
        if !self.is_empty() {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.source_url {
            config.source_url = url.clone();
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(addr) = self.serve_listen {
            config.serve_listen = addr;
        }
        if let Some(embedded) = self.service_embedded {
            config.service_embedded = embedded;
        }
        if let Some(ref path) = self.catalog_file {
            config.catalog_file = Some(path.clone());
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
