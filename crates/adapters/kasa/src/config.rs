//! Kasa adapter configuration.

use std::time::Duration;

use serde::Deserialize;

/// Port legacy Kasa devices listen on, for both TCP and UDP.
pub const DEFAULT_PORT: u16 = 9999;

/// Configuration for talking to Kasa plugs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KasaConfig {
    /// Device port for commands and discovery.
    pub port: u16,
    /// Bound on connect, write, and read of a single command, in seconds.
    pub command_timeout_secs: u64,
    /// Listening window of a discovery retry with default parameters, in seconds.
    pub discovery_timeout_secs: u64,
}

impl Default for KasaConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            command_timeout_secs: 10,
            discovery_timeout_secs: 3,
        }
    }
}

impl KasaConfig {
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    #[must_use]
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }
}
