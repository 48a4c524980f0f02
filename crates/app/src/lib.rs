//! # onelight-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceRegistry`: persistence of registered devices
//!   - `PlugAdapter` / `AdapterFactory`: control surface of one physical plug
//!   - `DiscoveryScanner`: time-bounded broadcast scan
//!   - `BroadcastResolver`: pick the broadcast address to scan
//! - Define **driving/inbound ports** as use-case structs:
//!   - `DiscoveryEngine`: scan, normalize, filter against the registry
//!   - `AdapterCache`: one live adapter per registered device
//!   - `DeviceManager`: discover / provision / `turn_on` / `turn_off` / `get_state`
//!
//! ## Dependency rule
//! Depends on `onelight-domain` only (plus `tokio::sync` and `tokio::time`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;

#[cfg(test)]
mod fakes;
