//! Registry port: persistence of registered devices.

use std::future::Future;
use std::sync::Arc;

use onelight_domain::device::{Device, NewDevice, PowerStatus};
use onelight_domain::error::OneLightError;
use onelight_domain::id::{DeviceId, OwnerId};
use onelight_domain::time::Timestamp;

/// Storage of [`Device`]s, implemented by a persistence adapter.
///
/// The registry is treated as externally synchronized: the core issues
/// single-row reads and writes and never relies on cross-call transactions.
pub trait DeviceRegistry {
    /// Find the device currently registered at `address`.
    fn find_by_address(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Option<Device>, OneLightError>> + Send;

    /// Find the device with the given hardware id (MAC), ignoring case.
    fn find_by_hardware_id(
        &self,
        hardware_id: &str,
    ) -> impl Future<Output = Result<Option<Device>, OneLightError>> + Send;

    /// Get a device by its unique identifier.
    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, OneLightError>> + Send;

    /// Insert a new device and return the id assigned to it.
    fn insert(
        &self,
        device: NewDevice,
    ) -> impl Future<Output = Result<DeviceId, OneLightError>> + Send;

    /// Record an observed power status. Returns `false` when no row matched.
    fn update_status(
        &self,
        id: DeviceId,
        status: PowerStatus,
        last_seen: Timestamp,
    ) -> impl Future<Output = Result<bool, OneLightError>> + Send;

    /// List the devices owned by `owner_id`, ordered by id.
    fn list_by_owner(
        &self,
        owner_id: OwnerId,
    ) -> impl Future<Output = Result<Vec<Device>, OneLightError>> + Send;
}

impl<T: DeviceRegistry + Send + Sync> DeviceRegistry for Arc<T> {
    fn find_by_address(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Option<Device>, OneLightError>> + Send {
        (**self).find_by_address(address)
    }

    fn find_by_hardware_id(
        &self,
        hardware_id: &str,
    ) -> impl Future<Output = Result<Option<Device>, OneLightError>> + Send {
        (**self).find_by_hardware_id(hardware_id)
    }

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, OneLightError>> + Send {
        (**self).get_by_id(id)
    }

    fn insert(
        &self,
        device: NewDevice,
    ) -> impl Future<Output = Result<DeviceId, OneLightError>> + Send {
        (**self).insert(device)
    }

    fn update_status(
        &self,
        id: DeviceId,
        status: PowerStatus,
        last_seen: Timestamp,
    ) -> impl Future<Output = Result<bool, OneLightError>> + Send {
        (**self).update_status(id, status, last_seen)
    }

    fn list_by_owner(
        &self,
        owner_id: OwnerId,
    ) -> impl Future<Output = Result<Vec<Device>, OneLightError>> + Send {
        (**self).list_by_owner(owner_id)
    }
}
