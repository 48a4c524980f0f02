//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `onelight.toml` in the working directory. Every field has a
//! default so the file is optional. Environment variables take precedence
//! over file values.

use std::net::Ipv4Addr;
use std::time::Duration;

use onelight_adapter_kasa::KasaConfig;
use onelight_adapter_storage_sqlite_sqlx::StoreConfig;
use onelight_adapter_storage_sqlite_sqlx::store::DEFAULT_MAX_CONNECTIONS;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Network discovery settings.
    pub discovery: DiscoveryConfig,
    /// Kasa protocol settings.
    pub kasa: KasaConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Scan window used when a request does not ask for one, in seconds.
    pub timeout_secs: u64,
    /// Fixed broadcast target. Detected from the default route when unset.
    pub broadcast: Option<String>,
}

impl Config {
    /// Load configuration from `onelight.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting values fail validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("onelight.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("ONELIGHT_HOST") {
            self.server.host = val;
        }
        if let Some(port) = lookup("ONELIGHT_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = lookup("ONELIGHT_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = lookup("ONELIGHT_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = lookup("ONELIGHT_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("ONELIGHT_BROADCAST") {
            self.discovery.broadcast = Some(val).filter(|v| !v.trim().is_empty());
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database max_connections must be non-zero".to_string(),
            ));
        }
        if self.discovery.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "discovery timeout must be non-zero".to_string(),
            ));
        }
        self.broadcast_target()?;
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Registry store settings.
    #[must_use]
    pub fn store(&self) -> StoreConfig {
        StoreConfig {
            database_url: self.database.url.clone(),
            max_connections: self.database.max_connections,
        }
    }

    #[must_use]
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery.timeout_secs)
    }

    /// Parse the broadcast override, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when the override is not an IPv4
    /// address.
    pub fn broadcast_target(&self) -> Result<Option<Ipv4Addr>, ConfigError> {
        self.discovery
            .broadcast
            .as_deref()
            .map(|raw| {
                raw.trim().parse().map_err(|_| {
                    ConfigError::Validation(format!("invalid broadcast address {raw:?}"))
                })
            })
            .transpose()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:onelight.db?mode=rwc".to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "onelightd=info,onelight=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            broadcast: None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
