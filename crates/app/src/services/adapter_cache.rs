//! Adapter cache: one live adapter per registered device.
//!
//! Adapters are created lazily on the first control or state call for a
//! device and reused afterwards, so sessions are refreshed rather than
//! re-established. Each adapter sits behind its own async mutex: commands to
//! the same plug are serialized, commands to different plugs are not.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use onelight_domain::error::OneLightError;
use onelight_domain::id::DeviceId;

use crate::ports::AdapterFactory;

/// Handle to a cached adapter. Lock it for the duration of one operation.
pub type SharedAdapter<A> = Arc<tokio::sync::Mutex<A>>;

/// Process-lifetime mapping from device id to its adapter.
pub struct AdapterCache<F: AdapterFactory> {
    factory: F,
    entries: Mutex<HashMap<DeviceId, SharedAdapter<F::Adapter>>>,
}

impl<F: AdapterFactory> AdapterCache<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the adapter cached for `id`, creating one bound to `address`
    /// when there is none.
    ///
    /// Creation happens under the map lock, so concurrent callers for the
    /// same id always share a single adapter.
    ///
    /// # Errors
    ///
    /// Returns [`OneLightError::MissingAddress`] when no adapter is cached and
    /// `address` is absent or blank.
    pub fn get_or_create(
        &self,
        id: DeviceId,
        address: Option<&str>,
    ) -> Result<SharedAdapter<F::Adapter>, OneLightError> {
        let mut entries = self.entries();
        if let Some(adapter) = entries.get(&id) {
            return Ok(Arc::clone(adapter));
        }

        let address = address
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or(OneLightError::MissingAddress(id))?;

        tracing::debug!(device_id = %id, address, "creating adapter");
        let adapter = Arc::new(tokio::sync::Mutex::new(self.factory.create(address)));
        entries.insert(id, Arc::clone(&adapter));
        Ok(adapter)
    }

    /// Drop the cached adapter for `id`. Returns whether one was cached.
    ///
    /// Callers holding a handle keep using it; the next lookup builds a
    /// fresh adapter.
    pub fn evict(&self, id: DeviceId) -> bool {
        self.entries().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    // A panic while holding the map lock cannot leave the map half-updated.
    fn entries(&self) -> MutexGuard<'_, HashMap<DeviceId, SharedAdapter<F::Adapter>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
