//! # onelight-adapter-kasa
//!
//! TP-Link Kasa smart plug adapter.
//!
//! ## Protocol
//! Legacy Kasa devices speak JSON encrypted with an XOR autokey cipher:
//! - control over TCP port 9999, each message prefixed with its length as a
//!   big-endian `u32` ([`protocol`], [`transport`])
//! - discovery over UDP broadcast to the same port, without the prefix
//!   ([`scanner`])
//!
//! ## Provided port implementations
//! - [`KasaPlug`] / [`KasaAdapterFactory`] implement `PlugAdapter` / `AdapterFactory`
//! - [`KasaScanner`] implements `DiscoveryScanner`
//!
//! ## Dependency rule
//! Depends on `onelight-app` (port traits) and `onelight-domain` only.

pub mod config;
pub mod error;
pub mod plug;
pub mod protocol;
pub mod scanner;
pub mod transport;

#[cfg(test)]
mod testing;

pub use config::KasaConfig;
pub use error::KasaError;
pub use plug::{KasaAdapterFactory, KasaPlug};
pub use scanner::KasaScanner;
