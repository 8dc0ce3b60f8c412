//! Server configuration loaded from `glitch.toml`.

use std::fs;
use std::path::Path;
use std::time::Duration;
use log::{info, warn};
use serde::Deserialize;
use glitch_shared::DEFAULT_PORT;

use crate::error::ConfigError;
use crate::status::DEFAULT_STATUS_INTERVAL;

/// Environment variable overriding the config file path
pub const CONFIG_ENV: &str = "GLITCH_CONFIG";

pub const DEFAULT_CONFIG_PATH: &str = "glitch.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Action bar refresh cadence in milliseconds
    pub status_interval_ms: u64,
    pub recipes_path: String,
    /// Player names allowed to run admin commands (case-insensitive)
    pub admins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            status_interval_ms: DEFAULT_STATUS_INTERVAL.as_millis() as u64,
            recipes_path: "recipes.toml".to_string(),
            admins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents, path)
    }

    fn from_toml(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load from `$GLITCH_CONFIG` or `glitch.toml`, falling back to defaults
    pub fn load() -> Self {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let path = Path::new(&path);
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => {
                info!("Configuration loaded from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    pub fn status_interval(&self) -> Duration {
        // A zero period would make tokio's interval panic
        Duration::from_millis(self.status_interval_ms.max(1))
    }

    pub fn is_admin(&self, name: &str) -> bool {
        self.admins.iter().any(|admin| admin.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ServerConfig::from_toml("port = 9000\nadmins = [\"Notch\"]", Path::new("test.toml")).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.status_interval(), Duration::from_millis(500));
        assert_eq!(config.recipes_path, "recipes.toml");
        assert!(config.is_admin("notch"));
        assert!(!config.is_admin("steve"));
    }

    #[test]
    fn test_bad_toml_is_a_parse_error() {
        let err = ServerConfig::from_toml("port = \"lots\"", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("Failed to parse bad.toml"));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = ServerConfig::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
