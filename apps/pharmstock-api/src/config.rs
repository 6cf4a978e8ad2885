//! # API Configuration
//!
//! Configuration for the PharmStock process.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     DATABASE_URL=sqlite:./data/app.db                                  │
//! │     PHARMSTOCK_SCANNER_DEVICE=/dev/ttyACM0                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $PHARMSTOCK_CONFIG, or                                             │
//! │     ~/.config/pharmstock/pharmstock.toml (Linux)                       │
//! │     ~/Library/Application Support/com.pharmstock.pharmstock/ (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     0.0.0.0:3000, sqlite:./app.db, no scanner                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # pharmstock.toml
//! [server]
//! bind_addr = "127.0.0.1"
//! port = 3000
//!
//! [storage]
//! engine = "sqlite"          # sqlite | memory
//! database_url = "sqlite:./app.db"
//! max_connections = 5
//! connect_timeout_ms = 30000
//!
//! [scanner]
//! device = "/dev/ttyACM0"    # "-" reads standard input; omit to disable
//! read_timeout_ms = 1000
//! retry_delay_ms = 1000
//! recent_capacity = 100
//!
//! [logging]
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use pharmstock_scan::CorrelatorConfig;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "PHARMSTOCK_CONFIG";

// =============================================================================
// Storage Engine
// =============================================================================

/// Which record store backs the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageEngine {
    /// File-backed SQLite through the sqlx pool.
    #[default]
    Sqlite,

    /// Process-local map. Contents are lost on exit.
    Memory,
}

impl std::fmt::Display for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageEngine::Sqlite => write!(f, "sqlite"),
            StorageEngine::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StorageEngine {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(StorageEngine::Sqlite),
            "memory" | "mem" => Ok(StorageEngine::Memory),
            other => Err(ConfigError::InvalidValue {
                name: "storage.engine".into(),
                reason: format!("unknown engine '{}', expected sqlite or memory", other),
            }),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address (default: 0.0.0.0 for all interfaces).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Listen port. 0 asks the OS for a free port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// Record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub engine: StorageEngine,

    /// SQLite location (`sqlite:./app.db`, a plain path, or `sqlite::memory:`).
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Pool size for the SQLite engine.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a request waits for a pooled connection (milliseconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
}

fn default_database_url() -> String {
    "sqlite:./app.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    30_000
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            engine: StorageEngine::default(),
            database_url: default_database_url(),
            max_connections: default_max_connections(),
            connect_timeout_ms: default_connect_timeout(),
        }
    }
}

/// Scan device settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerSettings {
    /// Device path, or `-` for standard input. `None` disables scanning.
    #[serde(default)]
    pub device: Option<String>,

    /// Bounded wait for one read (milliseconds).
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,

    /// Pause after a device read error (milliseconds).
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// How many scan events `/api/scans` keeps.
    #[serde(default = "default_recent_capacity")]
    pub recent_capacity: usize,
}

fn default_read_timeout() -> u64 {
    1000
}

fn default_retry_delay() -> u64 {
    1000
}

fn default_recent_capacity() -> usize {
    100
}

impl Default for ScannerSettings {
    fn default() -> Self {
        ScannerSettings {
            device: None,
            read_timeout_ms: default_read_timeout(),
            retry_delay_ms: default_retry_delay(),
            recent_capacity: default_recent_capacity(),
        }
    }
}

impl ScannerSettings {
    /// Correlator timing derived from these settings.
    pub fn correlator_config(&self) -> CorrelatorConfig {
        CorrelatorConfig {
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset (e.g. `info`, `debug`).
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: default_log_level(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete process configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub scanner: ScannerSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    /// File the settings were read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl ApiConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else `$PHARMSTOCK_CONFIG`, else the
    ///    platform config dir)
    /// 3. Environment variables
    ///
    /// A file named explicitly (argument or `$PHARMSTOCK_CONFIG`) must exist;
    /// the platform default is optional.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let explicit = config_path.or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML config file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut config: ApiConfig = toml::from_str(&contents)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.engine == StorageEngine::Sqlite && self.storage.database_url.trim().is_empty() {
            return Err(ConfigError::MissingRequired("storage.database_url".into()));
        }

        if self.storage.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                name: "storage.max_connections".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.storage.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                name: "storage.connect_timeout_ms".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.scanner.read_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                name: "scanner.read_timeout_ms".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.scanner.recent_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                name: "scanner.recent_capacity".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if matches!(&self.scanner.device, Some(device) if device.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                name: "scanner.device".into(),
                reason: "must not be empty; omit it to disable scanning".into(),
            });
        }

        Ok(())
    }

    /// Applies overrides from an environment-like lookup.
    ///
    /// ## Variables
    /// | Variable | Field |
    /// |---|---|
    /// | `DATABASE_URL` | storage.database_url |
    /// | `PHARMSTOCK_BIND_ADDR` | server.bind_addr |
    /// | `PHARMSTOCK_PORT` | server.port |
    /// | `PHARMSTOCK_STORAGE` | storage.engine |
    /// | `PHARMSTOCK_SCANNER_DEVICE` | scanner.device (empty disables) |
    /// | `PHARMSTOCK_SCANNER_TIMEOUT_MS` | scanner.read_timeout_ms |
    /// | `PHARMSTOCK_LOG` | logging.level |
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.storage.database_url = url;
        }

        if let Some(addr) = lookup("PHARMSTOCK_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Some(port) = lookup("PHARMSTOCK_PORT") {
            self.server.port = parse_var("PHARMSTOCK_PORT", &port)?;
        }

        if let Some(engine) = lookup("PHARMSTOCK_STORAGE") {
            self.storage.engine = engine.parse()?;
        }

        if let Some(device) = lookup("PHARMSTOCK_SCANNER_DEVICE") {
            self.scanner.device = if device.trim().is_empty() {
                None
            } else {
                Some(device)
            };
        }

        if let Some(timeout) = lookup("PHARMSTOCK_SCANNER_TIMEOUT_MS") {
            self.scanner.read_timeout_ms = parse_var("PHARMSTOCK_SCANNER_TIMEOUT_MS", &timeout)?;
        }

        if let Some(level) = lookup("PHARMSTOCK_LOG") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "pharmstock", "pharmstock")
            .map(|dirs| dirs.config_dir().join("pharmstock.toml"))
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        reason: format!("cannot parse '{}'", value),
    })
}

// =============================================================================
// Errors
// =============================================================================

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.server.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.storage.engine, StorageEngine::Sqlite);
        assert_eq!(config.storage.database_url, "sqlite:./app.db");
        assert!(config.scanner.device.is_none());
        assert_eq!(
            config.scanner.correlator_config(),
            CorrelatorConfig::default()
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ApiConfig = toml::from_str(
            r#"
            [storage]
            engine = "memory"

            [scanner]
            device = "/dev/ttyACM0"
            read_timeout_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.engine, StorageEngine::Memory);
        assert_eq!(config.storage.max_connections, 5);
        assert_eq!(config.storage.connect_timeout_ms, 30_000);
        assert_eq!(config.scanner.device.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(
            config.scanner.correlator_config().read_timeout,
            Duration::from_millis(250)
        );
        assert_eq!(config.scanner.retry_delay_ms, 1000);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ApiConfig::default();
        config
            .apply_overrides(env(&[
                ("DATABASE_URL", "sqlite:/var/lib/pharmstock/app.db"),
                ("PHARMSTOCK_PORT", "8081"),
                ("PHARMSTOCK_STORAGE", "Memory"),
                ("PHARMSTOCK_SCANNER_DEVICE", "-"),
                ("PHARMSTOCK_LOG", "debug"),
            ]))
            .unwrap();

        assert_eq!(config.storage.database_url, "sqlite:/var/lib/pharmstock/app.db");
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.storage.engine, StorageEngine::Memory);
        assert_eq!(config.scanner.device.as_deref(), Some("-"));
        assert_eq!(config.logging.level, "debug");

        // Empty device disables scanning
        config
            .apply_overrides(env(&[("PHARMSTOCK_SCANNER_DEVICE", "")]))
            .unwrap();
        assert!(config.scanner.device.is_none());
    }

    #[test]
    fn test_bad_env_values_rejected() {
        let mut config = ApiConfig::default();
        assert!(matches!(
            config.apply_overrides(env(&[("PHARMSTOCK_PORT", "eighty")])),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(config
            .apply_overrides(env(&[("PHARMSTOCK_STORAGE", "postgres")]))
            .is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = ApiConfig::default();
        config.storage.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = ApiConfig::default();
        config.scanner.recent_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = ApiConfig::default();
        config.storage.connect_timeout_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref name, .. }) if name == "storage.connect_timeout_ms"
        ));

        let mut config = ApiConfig::default();
        config.storage.database_url = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(_))
        ));

        // The memory engine ignores the URL
        config.storage.engine = StorageEngine::Memory;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pharmstock.toml");
        std::fs::write(&path, "[server]\nport = 9090\n").unwrap();

        let config = ApiConfig::from_file(&path).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.source.as_deref(), Some(path.as_path()));
        assert!(ApiConfig::default().source.is_none());

        let missing = ApiConfig::from_file(&dir.path().join("absent.toml"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&ApiConfig::default()).unwrap();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("engine = \"sqlite\""));
    }
}
