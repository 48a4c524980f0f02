//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod adapter_cache;
pub mod device_manager;
pub mod discovery_engine;

pub use adapter_cache::{AdapterCache, SharedAdapter};
pub use device_manager::DeviceManager;
pub use discovery_engine::{DiscoveryEngine, DiscoveryError};
