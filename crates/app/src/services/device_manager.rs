//! Device manager: the single entry point used by the web layer.
//!
//! Composes the registry, the discovery engine, and the adapter cache. Only
//! plain data crosses this boundary: callers never see adapters or sockets.

use std::time::Duration;

use onelight_domain::device::{Device, NewDevice, PowerStatus};
use onelight_domain::discovery::DiscoveryRecord;
use onelight_domain::error::{OneLightError, ValidationError};
use onelight_domain::id::{DeviceId, OwnerId};
use onelight_domain::state::PlugState;
use onelight_domain::time;

use crate::ports::{
    AdapterFactory, BroadcastResolver, DeviceRegistry, DiscoveryScanner, PlugAdapter,
};
use crate::services::adapter_cache::AdapterCache;
use crate::services::discovery_engine::DiscoveryEngine;

/// Orchestrates discovery, provisioning, and control of plugs.
pub struct DeviceManager<R, F: AdapterFactory, S, B> {
    registry: R,
    discovery: DiscoveryEngine<S, B>,
    adapters: AdapterCache<F>,
}

impl<R, F, S, B> DeviceManager<R, F, S, B>
where
    R: DeviceRegistry + Send + Sync,
    F: AdapterFactory,
    S: DiscoveryScanner,
    B: BroadcastResolver,
{
    /// Create a manager with an empty adapter cache.
    pub fn new(registry: R, factory: F, scanner: S, resolver: B) -> Self {
        Self {
            registry,
            discovery: DiscoveryEngine::new(scanner, resolver),
            adapters: AdapterCache::new(factory),
        }
    }

    /// Unregistered devices answering a scan bounded by `timeout`.
    pub async fn discover(&self, timeout: Duration) -> Vec<DiscoveryRecord> {
        self.discovery.discover(&self.registry, timeout).await
    }

    /// Register a discovered device under `owner_id`.
    ///
    /// Returns [`DeviceId::INVALID`] when the device could not be stored;
    /// the cause is logged. Provisioning the same record twice registers two
    /// devices.
    #[tracing::instrument(skip(self, record), fields(address = %record.address))]
    pub async fn provision(
        &self,
        record: &DiscoveryRecord,
        owner_id: OwnerId,
        name: &str,
    ) -> DeviceId {
        match self.try_provision(record, owner_id, name).await {
            Ok(id) if id.is_valid() => {
                tracing::info!(device_id = %id, "device provisioned");
                id
            }
            Ok(id) => {
                tracing::error!(device_id = %id, "registry returned an invalid id");
                DeviceId::INVALID
            }
            Err(err) => {
                tracing::error!(error = %err, "provisioning failed");
                DeviceId::INVALID
            }
        }
    }

    async fn try_provision(
        &self,
        record: &DiscoveryRecord,
        owner_id: OwnerId,
        name: &str,
    ) -> Result<DeviceId, OneLightError> {
        let address = record.address.trim();
        if address.is_empty() {
            return Err(ValidationError::EmptyAddress.into());
        }

        let mut builder = NewDevice::builder()
            .name(name)
            .owner_id(owner_id)
            .address(address)
            .provisioned(true);
        if let Some(model) = &record.model_name {
            builder = builder.model(model.as_str());
        }
        if let Some(hardware_id) = &record.hardware_id {
            builder = builder.hardware_id(hardware_id.as_str());
        }

        self.registry.insert(builder.build()?).await
    }

    /// Look up a registered device.
    ///
    /// # Errors
    ///
    /// Returns [`OneLightError::DeviceNotFound`] when `id` is not registered,
    /// or a storage error from the registry.
    pub async fn get_device(&self, id: DeviceId) -> Result<Device, OneLightError> {
        self.registry
            .get_by_id(id)
            .await?
            .ok_or(OneLightError::DeviceNotFound(id))
    }

    /// Devices registered to `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the registry.
    pub async fn list_devices(&self, owner_id: OwnerId) -> Result<Vec<Device>, OneLightError> {
        self.registry.list_by_owner(owner_id).await
    }

    /// Switch the plug on and record the new status.
    ///
    /// # Errors
    ///
    /// Returns [`OneLightError::DeviceNotFound`], [`OneLightError::MissingAddress`],
    /// or the adapter failure when the plug does not acknowledge. The status
    /// is written only after the plug acknowledged; a failed write is logged.
    #[tracing::instrument(skip(self))]
    pub async fn turn_on(&self, id: DeviceId) -> Result<(), OneLightError> {
        self.switch(id, PowerStatus::On).await
    }

    /// Switch the plug off and record the new status.
    ///
    /// # Errors
    ///
    /// Same as [`turn_on`](Self::turn_on).
    #[tracing::instrument(skip(self))]
    pub async fn turn_off(&self, id: DeviceId) -> Result<(), OneLightError> {
        self.switch(id, PowerStatus::Off).await
    }

    /// Read the plug's relay state and record it.
    ///
    /// An unreachable plug reads as off. Failing to record the observation
    /// is logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns [`OneLightError::DeviceNotFound`] or
    /// [`OneLightError::MissingAddress`].
    #[tracing::instrument(skip(self))]
    pub async fn get_state(&self, id: DeviceId) -> Result<PlugState, OneLightError> {
        let device = self.get_device(id).await?;
        let adapter = self.adapters.get_or_create(id, device.address.as_deref())?;
        let state = adapter.lock().await.get_state().await;

        if let Err(err) = self.record_status(id, state.status()).await {
            tracing::warn!(error = %err, "could not record observed state");
        }
        Ok(state)
    }

    async fn switch(&self, id: DeviceId, target: PowerStatus) -> Result<(), OneLightError> {
        let device = self.get_device(id).await?;
        let adapter = self.adapters.get_or_create(id, device.address.as_deref())?;

        let outcome = {
            let mut adapter = adapter.lock().await;
            match target {
                PowerStatus::On => adapter.turn_on().await,
                PowerStatus::Off => adapter.turn_off().await,
            }
        };

        if let Err(err) = outcome {
            if err.is_unreachable() && self.adapters.evict(id) {
                tracing::warn!(device_id = %id, "plug unreachable, adapter evicted");
            }
            return Err(err.into());
        }

        // The plug already switched; a failed write only loses bookkeeping.
        if let Err(err) = self.record_status(id, target).await {
            tracing::warn!(device_id = %id, %target, error = %err, "switched plug but could not record status");
        }
        Ok(())
    }

    async fn record_status(&self, id: DeviceId, status: PowerStatus) -> Result<(), OneLightError> {
        let updated = self.registry.update_status(id, status, time::now()).await?;
        if !updated {
            tracing::warn!(device_id = %id, %status, "device vanished before its status was recorded");
        }
        Ok(())
    }
}
