//! Bootstrap configuration loading
//!
//! Config file resolution follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`SONARA_CONFIG`)
//! 3. Platform config directory (`{config_dir}/sonara/config.toml`)
//!
//! A missing or unreadable file never stops startup: the caller gets compiled
//! defaults and a warning is logged.

use crate::{Error, FadeCurve, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SONARA_CONFIG";

/// Default HTTP control port
pub const DEFAULT_PORT: u16 = 5750;

/// Default remote API base URL (search + stream lookup)
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Top-level TOML configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// HTTP control port
    pub port: u16,

    /// Base URL of the search/stream API
    pub api_base_url: String,

    /// Preference database path (splash flag, search history)
    pub database_path: PathBuf,

    /// Timeout for remote API requests
    pub request_timeout_ms: u64,

    pub fade: FadeConfig,

    pub autoplay: AutoplayConfig,

    pub logging: LoggingConfig,
}

/// Crossfade ramp settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FadeConfig {
    /// Length of one ramp (fade-out or fade-in)
    pub duration_ms: u64,
    /// Number of volume steps per ramp
    pub steps: u32,
    pub curve: FadeCurve,
}

/// Autoplay monitor settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutoplayConfig {
    /// How often the native position is polled
    pub poll_interval_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); RUST_LOG wins when set
    pub level: String,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            database_path: default_database_path(),
            request_timeout_ms: 15_000,
            fade: FadeConfig::default(),
            autoplay: AutoplayConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            duration_ms: 800,
            steps: 20,
            curve: FadeCurve::Linear,
        }
    }
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self { poll_interval_ms: 250 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TomlConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve and load the config file, falling back to defaults
    pub fn load_or_default(cli_path: Option<&Path>) -> Self {
        let Some(path) = resolve_config_path(cli_path) else {
            info!("No config file found, using built-in defaults");
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Reject values the player cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(Error::Config("api_base_url must not be empty".to_string()));
        }
        if self.fade.steps == 0 {
            return Err(Error::Config("fade.steps must be at least 1".to_string()));
        }
        if self.autoplay.poll_interval_ms == 0 {
            return Err(Error::Config(
                "autoplay.poll_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Find the config file to use, if any
pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: command-line argument, used even if missing so the
    // caller reports it
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    // Priority 2: environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: platform config directory
    dirs::config_dir()
        .map(|d| d.join("sonara").join("config.toml"))
        .filter(|p| p.exists())
}

/// OS-dependent default location of the preference database
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("sonara").join("sonara.db"))
        .unwrap_or_else(|| PathBuf::from("./sonara_data/sonara.db"))
}
