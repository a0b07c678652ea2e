//! Configuration management for roster.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "roster";

/// Default backing file name.
const DATA_FILE_NAME: &str = "people.json";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "ROSTER_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ROSTER_`, nested with `__`,
///    e.g. `ROSTER_SERVER__PORT=9000`)
/// 2. TOML config file at `~/.config/roster/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// HTTP server configuration.
    pub server: ServerConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the JSON file holding all people.
    /// Defaults to `~/.local/share/roster/people.json`
    pub data_path: Option<PathBuf>,
    /// Write the file pretty-printed rather than compact.
    pub pretty: bool,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host or address to bind.
    pub host: String,
    /// Port to bind. 0 picks a free port.
    pub port: u16,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_path: None, // Will be resolved to default at runtime
            pretty: true,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Config {
    /// Load configuration, from `config_path` or the default location.
    ///
    /// Sources are layered, later ones overriding earlier ones:
    /// 1. Default values
    /// 2. TOML config file (if it exists)
    /// 3. Environment variables (prefixed with `ROSTER_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        Self::from_figment(Self::figment(&config_file))
    }

    /// The provider stack used by [`Config::load_from`].
    #[must_use]
    pub fn figment(config_file: &std::path::Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extract and validate configuration from a figment.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or validation fails.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "server.host must not be empty".to_string(),
            });
        }

        if let Some(path) = &self.storage.data_path {
            if path.file_name().is_none() {
                return Err(Error::ConfigValidation {
                    message: format!("storage.data_path must name a file: {}", path.display()),
                });
            }
        }

        Ok(())
    }

    /// Get the backing file path, resolving defaults if not set.
    #[must_use]
    pub fn data_path(&self) -> PathBuf {
        self.storage
            .data_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATA_FILE_NAME))
    }

    /// Get the `host:port` address the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.data_path.is_none());
        assert!(config.storage.pretty);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_host() {
        let mut config = Config::default();
        config.server.host = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("server.host"));
    }

    #[test]
    fn test_validate_data_path_without_file_name() {
        let mut config = Config::default();
        config.storage.data_path = Some(PathBuf::from("/"));

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("storage.data_path"));
    }

    #[test]
    fn test_data_path_default() {
        let config = Config::default();
        let path = config.data_path();

        assert!(path.to_string_lossy().contains("roster"));
        assert!(path.to_string_lossy().ends_with("people.json"));
    }

    #[test]
    fn test_data_path_custom() {
        let mut config = Config::default();
        config.storage.data_path = Some(PathBuf::from("/srv/people.json"));

        assert_eq!(config.data_path(), PathBuf::from("/srv/people.json"));
    }

    #[test]
    fn test_bind_addr() {
        let mut config = Config::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");

        config.server.host = "0.0.0.0".to_string();
        config.server.port = 9000;
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("roster"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        Jail::expect_with(|_jail| {
            let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")))
                .expect("defaults should load");
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_from_toml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [storage]
                data_path = "/tmp/roster/people.json"
                pretty = false

                [server]
                port = 9100
                "#,
            )?;

            let config = Config::load_from(Some(PathBuf::from("config.toml")))
                .expect("config should load");
            assert_eq!(config.data_path(), PathBuf::from("/tmp/roster/people.json"));
            assert!(!config.storage.pretty);
            assert_eq!(config.server.port, 9100);
            assert_eq!(config.server.host, "127.0.0.1");
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_toml() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[server]\nport = 9100\n")?;
            jail.set_env("ROSTER_SERVER__PORT", "9200");
            jail.set_env("ROSTER_STORAGE__DATA_PATH", "/var/lib/roster/people.json");

            let config = Config::load_from(Some(PathBuf::from("config.toml")))
                .expect("config should load");
            assert_eq!(config.server.port, 9200);
            assert_eq!(
                config.data_path(),
                PathBuf::from("/var/lib/roster/people.json")
            );
            Ok(())
        });
    }

    #[test]
    fn test_invalid_toml_value() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[server]\nport = \"not a port\"\n")?;

            let result = Config::load_from(Some(PathBuf::from("config.toml")));
            assert!(matches!(result, Err(Error::ConfigLoad(_))));
            Ok(())
        });
    }

    #[test]
    fn test_config_clone() {
        let config = Config::default();
        let cloned = config.clone();
        assert_eq!(config, cloned);
    }

    #[test]
    fn test_storage_config_deserialize() {
        let json = r#"{"data_path": "/data/people.json"}"#;
        let storage: StorageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(storage.data_path, Some(PathBuf::from("/data/people.json")));
        assert!(storage.pretty);
    }

    #[test]
    fn test_server_config_serialize() {
        let server = ServerConfig::default();
        let json = serde_json::to_string(&server).unwrap();
        assert!(json.contains("\"port\":8000"));
    }
}
