//! In-memory ports for router tests.

use std::net::Ipv4Addr;
use std::sync::Mutex;
use std::time::Duration;

use onelight_app::ports::{
    AdapterFactory, BroadcastResolver, DeviceRegistry, DiscoveryScanner, PlugAdapter, ScanError,
};
use onelight_app::services::DeviceManager;
use onelight_domain::device::{Device, NewDevice, PowerStatus};
use onelight_domain::discovery::RawResponse;
use onelight_domain::error::{AdapterError, OneLightError};
use onelight_domain::id::{DeviceId, OwnerId};
use onelight_domain::state::PlugState;
use onelight_domain::time::Timestamp;
use serde_json::json;

use crate::state::AppState;

pub type TestState = AppState<MemoryRegistry, StubFactory, StubScanner, NoTarget>;

pub fn state() -> TestState {
    with_factory(StubFactory { reachable: true })
}

pub fn unreachable_state() -> TestState {
    with_factory(StubFactory { reachable: false })
}

fn with_factory(factory: StubFactory) -> TestState {
    let manager = DeviceManager::new(MemoryRegistry::default(), factory, StubScanner, NoTarget);
    AppState::new(manager, Duration::from_millis(10))
}

#[derive(Default)]
pub struct MemoryRegistry {
    devices: Mutex<Vec<Device>>,
}

impl DeviceRegistry for MemoryRegistry {
    async fn find_by_address(&self, address: &str) -> Result<Option<Device>, OneLightError> {
        let devices = self.devices.lock().unwrap();
        Ok(devices
            .iter()
            .find(|d| d.address.as_deref() == Some(address))
            .cloned())
    }

    async fn find_by_hardware_id(&self, hardware_id: &str) -> Result<Option<Device>, OneLightError> {
        let devices = self.devices.lock().unwrap();
        Ok(devices
            .iter()
            .find(|d| {
                d.hardware_id
                    .as_deref()
                    .is_some_and(|hw| hw.eq_ignore_ascii_case(hardware_id))
            })
            .cloned())
    }

    async fn get_by_id(&self, id: DeviceId) -> Result<Option<Device>, OneLightError> {
        let devices = self.devices.lock().unwrap();
        Ok(devices.iter().find(|d| d.id == id).cloned())
    }

    async fn insert(&self, device: NewDevice) -> Result<DeviceId, OneLightError> {
        let mut devices = self.devices.lock().unwrap();
        let id = DeviceId::from_raw(i64::try_from(devices.len()).unwrap() + 1);
        devices.push(Device {
            id,
            name: device.name,
            model: device.model,
            owner_id: device.owner_id,
            address: device.address,
            hardware_id: device.hardware_id,
            status: None,
            last_seen: None,
            provisioned: device.provisioned,
        });
        Ok(id)
    }

    async fn update_status(
        &self,
        id: DeviceId,
        status: PowerStatus,
        last_seen: Timestamp,
    ) -> Result<bool, OneLightError> {
        let mut devices = self.devices.lock().unwrap();
        Ok(devices.iter_mut().find(|d| d.id == id).is_some_and(|device| {
            device.status = Some(status);
            device.last_seen = Some(last_seen);
            true
        }))
    }

    async fn list_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Device>, OneLightError> {
        let devices = self.devices.lock().unwrap();
        Ok(devices
            .iter()
            .filter(|d| d.owner_id == owner_id)
            .cloned()
            .collect())
    }
}

/// Answers every scan with one plug at 192.168.1.50.
pub struct StubScanner;

impl DiscoveryScanner for StubScanner {
    fn default_timeout(&self) -> Duration {
        Duration::from_millis(10)
    }

    async fn scan(
        &self,
        _target: Option<Ipv4Addr>,
        _timeout: Duration,
    ) -> Result<Vec<RawResponse>, ScanError> {
        Ok(vec![RawResponse::new(
            "192.168.1.50",
            json!({ "hardware_id": "AA:BB:CC:DD:EE:FF", "model_name": "PlugX" }),
        )])
    }
}

pub struct NoTarget;

impl BroadcastResolver for NoTarget {
    fn resolve_broadcast_target(&self) -> Option<Ipv4Addr> {
        None
    }
}

pub struct StubFactory {
    reachable: bool,
}

impl AdapterFactory for StubFactory {
    type Adapter = StubPlug;

    fn create(&self, address: &str) -> StubPlug {
        StubPlug {
            address: address.to_string(),
            reachable: self.reachable,
            is_on: false,
        }
    }
}

pub struct StubPlug {
    address: String,
    reachable: bool,
    is_on: bool,
}

impl StubPlug {
    fn reach(&self) -> Result<(), AdapterError> {
        if self.reachable {
            Ok(())
        } else {
            Err(AdapterError::Unreachable {
                address: self.address.clone(),
                source: std::io::Error::from(std::io::ErrorKind::TimedOut),
            })
        }
    }
}

impl PlugAdapter for StubPlug {
    fn address(&self) -> &str {
        &self.address
    }

    async fn connect_or_refresh(&mut self) -> Result<(), AdapterError> {
        self.reach()
    }

    async fn turn_on(&mut self) -> Result<(), AdapterError> {
        self.reach()?;
        self.is_on = true;
        Ok(())
    }

    async fn turn_off(&mut self) -> Result<(), AdapterError> {
        self.reach()?;
        self.is_on = false;
        Ok(())
    }

    async fn read_state(&mut self) -> Result<PlugState, AdapterError> {
        self.reach()?;
        Ok(PlugState { is_on: self.is_on })
    }
}
