//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod adapter;
pub mod discovery;
pub mod network;
pub mod registry;

pub use adapter::{AdapterFactory, PlugAdapter};
pub use discovery::{DiscoveryScanner, ScanError};
pub use network::BroadcastResolver;
pub use registry::DeviceRegistry;
