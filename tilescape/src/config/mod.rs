//! Configuration file handling for ~/.tilescape/config.ini.
//!
//! Loads and saves user configuration with sensible defaults. A missing
//! file yields the defaults; a present file only needs to name the keys it
//! overrides.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::service::ServiceConfig;

/// Default HTTP timeout for tile downloads, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or parse the config file
    #[error("Failed to read config file: {0}")]
    Read(#[from] ini::Error),

    /// Failed to write the config file
    #[error("Failed to write config file: {0}")]
    Write(String),

    /// A value failed to parse
    #[error("Invalid configuration: {section}.{key} = '{value}'")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },
}

/// Cache settings from the `[cache]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Directory holding the blob store and index database.
    pub directory: PathBuf,
    /// Whether the persistent cache is consulted at all.
    pub enabled: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            directory: cache_directory(),
            enabled: true,
        }
    }
}

/// Network settings from the `[network]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSettings {
    /// Start in offline mode (placeholder tiles for every cache miss).
    pub offline: bool,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            offline: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Parsed user configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    /// `[cache]` section.
    pub cache: CacheSettings,
    /// `[network]` section.
    pub network: NetworkSettings,
}

impl ConfigFile {
    /// Load configuration from the default path (~/.tilescape/config.ini).
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("cache")) {
            if let Some(dir) = section.get("directory") {
                config.cache.directory = PathBuf::from(dir);
            }
            if let Some(enabled) = section.get("enabled") {
                config.cache.enabled = parse_bool("cache", "enabled", enabled)?;
            }
        }

        if let Some(section) = ini.section(Some("network")) {
            if let Some(offline) = section.get("offline") {
                config.network.offline = parse_bool("network", "offline", offline)?;
            }
            if let Some(timeout) = section.get("timeout_secs") {
                config.network.timeout_secs =
                    timeout
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue {
                            section: "network".into(),
                            key: "timeout_secs".into(),
                            value: timeout.into(),
                        })?;
            }
        }

        Ok(config)
    }

    /// Save configuration to a specific path, creating parent directories
    /// as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write(e.to_string()))?;
        }

        let mut ini = Ini::new();
        ini.with_section(Some("cache"))
            .set("directory", self.cache.directory.display().to_string())
            .set("enabled", self.cache.enabled.to_string());
        ini.with_section(Some("network"))
            .set("offline", self.network.offline.to_string())
            .set("timeout_secs", self.network.timeout_secs.to_string());

        ini.write_to_file(path)
            .map_err(|e| ConfigError::Write(e.to_string()))
    }

    /// Build the acquisition service configuration from these settings.
    pub fn to_service_config(&self) -> ServiceConfig {
        ServiceConfig {
            cache_dir: self.cache.directory.clone(),
            cache_enabled: self.cache.enabled,
            offline_mode: self.network.offline,
            request_timeout_secs: self.network.timeout_secs,
        }
    }
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            section: section.into(),
            key: key.into(),
            value: value.into(),
        }),
    }
}

/// Path to the config directory (~/.tilescape).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tilescape")
}

/// Path to the config file (~/.tilescape/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

/// Default tile cache directory (~/.tilescape/cache).
pub fn cache_directory() -> PathBuf {
    config_directory().join("cache")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();
        assert!(config.cache.enabled);
        assert!(!config.network.offline);
        assert_eq!(config.network.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("missing.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.cache.directory = PathBuf::from("/tmp/tiles");
        config.cache.enabled = false;
        config.network.offline = true;
        config.network.timeout_secs = 7;
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults_for_missing_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[network]\noffline = yes\n").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert!(config.network.offline);
        assert_eq!(config.network.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_invalid_bool_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[cache]\nenabled = maybe\n").unwrap();

        let err = ConfigFile::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[network]\ntimeout_secs = soon\n").unwrap();

        assert!(ConfigFile::load_from(&path).is_err());
    }

    #[test]
    fn test_to_service_config() {
        let mut config = ConfigFile::default();
        config.network.offline = true;
        let service = config.to_service_config();
        assert!(service.offline_mode);
        assert!(service.cache_enabled);
        assert_eq!(service.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }
}
