//! Player configuration
//!
//! Resolved from the bootstrap [`TomlConfig`] with command-line overrides
//! applied on top. Cannot change while the service runs.

use sonara_common::config::TomlConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::playback::FadeSettings;

/// Values a command line may override
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub api_base_url: Option<String>,
    pub database: Option<PathBuf>,
}

/// Effective player configuration
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub port: u16,
    pub api_base_url: String,
    pub database_path: PathBuf,
    pub request_timeout: Duration,
    pub fade: FadeSettings,
    pub poll_interval: Duration,
    pub log_level: String,
}

impl PlayerConfig {
    pub fn resolve(toml: &TomlConfig, overrides: Overrides) -> Result<Self> {
        let api_base_url = overrides
            .api_base_url
            .unwrap_or_else(|| toml.api_base_url.clone());
        if api_base_url.trim().is_empty() {
            return Err(Error::Config("api_base_url must not be empty".to_string()));
        }

        Ok(Self {
            port: overrides.port.unwrap_or(toml.port),
            api_base_url,
            database_path: overrides
                .database
                .unwrap_or_else(|| toml.database_path.clone()),
            request_timeout: Duration::from_millis(toml.request_timeout_ms),
            fade: FadeSettings::from(&toml.fade),
            poll_interval: Duration::from_millis(toml.autoplay.poll_interval_ms.max(1)),
            log_level: toml.logging.level.clone(),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_pass_through() {
        let config = PlayerConfig::resolve(&TomlConfig::default(), Overrides::default()).unwrap();
        assert_eq!(config.port, 5750);
        assert_eq!(config.fade.step_interval(), Duration::from_millis(40));
        assert_eq!(config.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_overrides_win() {
        let config = PlayerConfig::resolve(
            &TomlConfig::default(),
            Overrides {
                port: Some(9000),
                api_base_url: Some("http://api.local".to_string()),
                database: Some(PathBuf::from("/tmp/x.db")),
            },
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.api_base_url, "http://api.local");
        assert_eq!(config.database_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.bind_addr().port(), 9000);
    }

    #[test]
    fn test_blank_api_url_rejected() {
        let result = PlayerConfig::resolve(
            &TomlConfig::default(),
            Overrides {
                api_base_url: Some("  ".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
