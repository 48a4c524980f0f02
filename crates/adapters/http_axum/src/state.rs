//! Shared application state for axum handlers.

use std::sync::Arc;
use std::time::Duration;

use onelight_app::ports::{AdapterFactory, BroadcastResolver, DeviceRegistry, DiscoveryScanner};
use onelight_app::services::DeviceManager;

/// Application state shared across all axum handlers.
///
/// Generic over the registry, adapter factory, scanner, and resolver to avoid
/// dynamic dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone`; only the `Arc` is cloned.
pub struct AppState<R, F: AdapterFactory, S, B> {
    /// Discovery, provisioning, and control.
    pub manager: Arc<DeviceManager<R, F, S, B>>,
    /// Scan duration when a discovery request does not name one.
    pub discovery_timeout: Duration,
}

impl<R, F: AdapterFactory, S, B> Clone for AppState<R, F, S, B> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
            discovery_timeout: self.discovery_timeout,
        }
    }
}

impl<R, F, S, B> AppState<R, F, S, B>
where
    R: DeviceRegistry + Send + Sync + 'static,
    F: AdapterFactory + 'static,
    S: DiscoveryScanner + 'static,
    B: BroadcastResolver + 'static,
{
    /// Create a new application state owning the manager.
    pub fn new(manager: DeviceManager<R, F, S, B>, discovery_timeout: Duration) -> Self {
        Self::from_arc(Arc::new(manager), discovery_timeout)
    }

    /// Create a new application state from a manager shared elsewhere.
    pub fn from_arc(manager: Arc<DeviceManager<R, F, S, B>>, discovery_timeout: Duration) -> Self {
        Self {
            manager,
            discovery_timeout,
        }
    }
}
