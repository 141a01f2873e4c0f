//! Bootstrap configuration
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables (`FQ_*`, read by clap in each binary)
//! 3. TOML configuration file
//! 4. Compiled defaults
//!
//! The TOML file itself is located the same way: `--config`, then
//! `FQ_CONFIG`, then `<config_dir>/fabquote/config.toml`. A missing file
//! logs a warning and falls back to defaults; a malformed one is an error.

use crate::params::BoundsPolicy;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Directory name used under the platform config/data directories
pub const APP_DIR: &str = "fabquote";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "FQ_CONFIG";

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;

/// Contents of `config.toml`; every field optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub bind_address: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// SQLite database file (relative or absolute)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub pricing: PricingConfig,

    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or full `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Skip parameter updates outside `[min_value, max_value]`
    #[serde(default = "default_true")]
    pub enforce_parameter_bounds: bool,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            enforce_parameter_bounds: true,
        }
    }
}

impl PricingConfig {
    pub fn bounds_policy(&self) -> BoundsPolicy {
        if self.enforce_parameter_bounds {
            BoundsPolicy::Enforce
        } else {
            BoundsPolicy::Lenient
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub server_url: Option<String>,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

impl TomlConfig {
    /// Parse a config file; a missing file is reported as [`Error::Io`]
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Locate and load the config file
    ///
    /// Returns the parsed config and the path it came from, or defaults and
    /// `None` if no file exists at the resolved location.
    pub fn load(cli_path: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let path = match cli_path.map(Path::to_path_buf).or(env_path) {
            Some(p) => p,
            None => match default_config_path() {
                Some(p) => p,
                None => {
                    warn!("Could not determine config directory, using defaults");
                    return Ok((Self::default(), None));
                }
            },
        };

        if !path.exists() {
            warn!("Config file not found at {}, using defaults", path.display());
            return Ok((Self::default(), None));
        }

        let config = Self::from_file(&path)?;
        info!("Loaded configuration from {}", path.display());
        Ok((config, Some(path)))
    }
}

/// `<config_dir>/fabquote/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// `<data_local_dir>/fabquote/fabquote.db`
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./fabquote_data"))
        .join("fabquote.db")
}

/// Server values supplied on the command line (or via their env vars)
#[derive(Debug, Clone, Default)]
pub struct ServerOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub lenient_bounds: bool,
}

/// Fully resolved server settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub bind_address: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub log_level: String,
    pub bounds_policy: BoundsPolicy,
}

impl ServerSettings {
    pub fn resolve(toml: &TomlConfig, overrides: ServerOverrides) -> Self {
        let bounds_policy = if overrides.lenient_bounds {
            BoundsPolicy::Lenient
        } else {
            toml.pricing.bounds_policy()
        };

        Self {
            bind_address: overrides
                .bind_address
                .or_else(|| toml.bind_address.clone())
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            port: overrides.port.or(toml.port).unwrap_or(DEFAULT_PORT),
            database_path: overrides
                .database_path
                .or_else(|| toml.database_path.clone())
                .unwrap_or_else(default_database_path),
            log_level: overrides
                .log_level
                .unwrap_or_else(|| toml.logging.level.clone()),
            bounds_policy,
        }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientOverrides {
    pub server_url: Option<String>,
    pub debounce_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
}

/// Fully resolved client settings
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub server_url: String,
    pub debounce: Duration,
    pub request_timeout: Duration,
}

impl ClientSettings {
    pub fn resolve(toml: &TomlConfig, overrides: ClientOverrides) -> Self {
        let server_url = overrides
            .server_url
            .or_else(|| toml.client.server_url.clone())
            .unwrap_or_else(|| {
                format!(
                    "http://{}:{}",
                    DEFAULT_BIND_ADDRESS,
                    toml.port.unwrap_or(DEFAULT_PORT)
                )
            });

        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            debounce: Duration::from_millis(
                overrides.debounce_ms.unwrap_or(toml.client.debounce_ms),
            ),
            request_timeout: Duration::from_millis(
                overrides
                    .request_timeout_ms
                    .unwrap_or(toml.client.request_timeout_ms),
            ),
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::resolve(&TomlConfig::default(), ClientOverrides::default())
    }
}

/// Create the parent directory of a file path if needed
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            info!("Created directory {}", parent.display());
        }
    }
    Ok(())
}
