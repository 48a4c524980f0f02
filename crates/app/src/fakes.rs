//! In-memory port implementations shared by the service tests.

use std::collections::{BTreeMap, VecDeque};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use onelight_domain::device::{Device, NewDevice, PowerStatus};
use onelight_domain::discovery::RawResponse;
use onelight_domain::error::{AdapterError, OneLightError};
use onelight_domain::id::{DeviceId, OwnerId};
use onelight_domain::state::PlugState;
use onelight_domain::time::Timestamp;

use crate::ports::{
    AdapterFactory, BroadcastResolver, DeviceRegistry, DiscoveryScanner, PlugAdapter, ScanError,
};

#[derive(Default)]
pub struct InMemoryRegistry {
    devices: Mutex<BTreeMap<DeviceId, Device>>,
    reject_inserts: AtomicBool,
    fail_status_writes: AtomicBool,
    status_writes: AtomicUsize,
}

impl InMemoryRegistry {
    pub fn rejecting_inserts() -> Self {
        let registry = Self::default();
        registry.reject_inserts.store(true, Ordering::SeqCst);
        registry
    }

    /// Make every later `update_status` fail with a storage error.
    pub fn fail_status_writes(&self) {
        self.fail_status_writes.store(true, Ordering::SeqCst);
    }

    pub fn status_writes(&self) -> usize {
        self.status_writes.load(Ordering::SeqCst)
    }

    pub fn device(&self, id: DeviceId) -> Option<Device> {
        self.devices.lock().unwrap().get(&id).cloned()
    }

    pub fn device_count(&self) -> usize {
        self.devices.lock().unwrap().len()
    }
}

impl DeviceRegistry for InMemoryRegistry {
    async fn find_by_address(&self, address: &str) -> Result<Option<Device>, OneLightError> {
        let devices = self.devices.lock().unwrap();
        Ok(devices
            .values()
            .find(|d| d.address.as_deref() == Some(address))
            .cloned())
    }

    async fn find_by_hardware_id(&self, hardware_id: &str) -> Result<Option<Device>, OneLightError> {
        let devices = self.devices.lock().unwrap();
        Ok(devices
            .values()
            .find(|d| {
                d.hardware_id
                    .as_deref()
                    .is_some_and(|hw| hw.eq_ignore_ascii_case(hardware_id))
            })
            .cloned())
    }

    async fn get_by_id(&self, id: DeviceId) -> Result<Option<Device>, OneLightError> {
        Ok(self.devices.lock().unwrap().get(&id).cloned())
    }

    async fn insert(&self, device: NewDevice) -> Result<DeviceId, OneLightError> {
        if self.reject_inserts.load(Ordering::SeqCst) {
            return Err(OneLightError::Storage("insert rejected".into()));
        }
        let mut devices = self.devices.lock().unwrap();
        let next = devices.keys().last().map_or(1, |id| id.as_raw() + 1);
        let id = DeviceId::from_raw(next);
        devices.insert(
            id,
            Device {
                id,
                name: device.name,
                model: device.model,
                owner_id: device.owner_id,
                address: device.address,
                hardware_id: device.hardware_id,
                status: None,
                last_seen: None,
                provisioned: device.provisioned,
            },
        );
        Ok(id)
    }

    async fn update_status(
        &self,
        id: DeviceId,
        status: PowerStatus,
        last_seen: Timestamp,
    ) -> Result<bool, OneLightError> {
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_status_writes.load(Ordering::SeqCst) {
            return Err(OneLightError::Storage("disk full".into()));
        }
        let mut devices = self.devices.lock().unwrap();
        Ok(devices.get_mut(&id).is_some_and(|device| {
            device.status = Some(status);
            device.last_seen = Some(last_seen);
            true
        }))
    }

    async fn list_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Device>, OneLightError> {
        let devices = self.devices.lock().unwrap();
        Ok(devices
            .values()
            .filter(|d| d.owner_id == owner_id)
            .cloned()
            .collect())
    }
}

/// Scanner that replays one scripted outcome per call, then answers empty.
#[derive(Default)]
pub struct ScriptedScanner {
    outcomes: Mutex<VecDeque<Result<Vec<RawResponse>, ScanError>>>,
    calls: Mutex<Vec<(Option<Ipv4Addr>, Duration)>>,
}

impl ScriptedScanner {
    pub fn replying(outcomes: Vec<Result<Vec<RawResponse>, ScanError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(Option<Ipv4Addr>, Duration)> {
        self.calls.lock().unwrap().clone()
    }
}

pub const SCANNER_DEFAULT_TIMEOUT: Duration = Duration::from_millis(20);

impl DiscoveryScanner for ScriptedScanner {
    fn default_timeout(&self) -> Duration {
        SCANNER_DEFAULT_TIMEOUT
    }

    async fn scan(
        &self,
        target: Option<Ipv4Addr>,
        timeout: Duration,
    ) -> Result<Vec<RawResponse>, ScanError> {
        self.calls.lock().unwrap().push((target, timeout));
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

pub struct FixedResolver(pub Option<Ipv4Addr>);

impl BroadcastResolver for FixedResolver {
    fn resolve_broadcast_target(&self) -> Option<Ipv4Addr> {
        self.0
    }
}

/// How every adapter built by a [`StubFactory`] behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubBehaviour {
    Healthy,
    FailingReads,
    Unreachable,
    Rejecting,
}

pub struct StubFactory {
    behaviour: StubBehaviour,
    created: Arc<AtomicUsize>,
}

impl StubFactory {
    pub fn new(behaviour: StubBehaviour) -> Self {
        Self {
            behaviour,
            created: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn created(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.created)
    }
}

impl AdapterFactory for StubFactory {
    type Adapter = StubAdapter;

    fn create(&self, address: &str) -> StubAdapter {
        self.created.fetch_add(1, Ordering::SeqCst);
        StubAdapter {
            address: address.to_string(),
            behaviour: self.behaviour,
            is_on: false,
        }
    }
}

#[derive(Debug)]
pub struct StubAdapter {
    address: String,
    behaviour: StubBehaviour,
    is_on: bool,
}

impl StubAdapter {
    fn command(&mut self, is_on: bool) -> Result<(), AdapterError> {
        match self.behaviour {
            StubBehaviour::Unreachable => Err(AdapterError::Unreachable {
                address: self.address.clone(),
                source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
            }),
            StubBehaviour::Rejecting => Err(AdapterError::Protocol {
                address: self.address.clone(),
                reason: "err_code -3".to_string(),
            }),
            StubBehaviour::Healthy | StubBehaviour::FailingReads => {
                self.is_on = is_on;
                Ok(())
            }
        }
    }
}

impl PlugAdapter for StubAdapter {
    fn address(&self) -> &str {
        &self.address
    }

    async fn connect_or_refresh(&mut self) -> Result<(), AdapterError> {
        Ok(())
    }

    async fn turn_on(&mut self) -> Result<(), AdapterError> {
        self.command(true)
    }

    async fn turn_off(&mut self) -> Result<(), AdapterError> {
        self.command(false)
    }

    async fn read_state(&mut self) -> Result<PlugState, AdapterError> {
        match self.behaviour {
            StubBehaviour::Healthy => Ok(PlugState { is_on: self.is_on }),
            _ => Err(AdapterError::Protocol {
                address: self.address.clone(),
                reason: "read failed".to_string(),
            }),
        }
    }
}

/// Scanner that never answers, for exercising the engine's own deadline.
pub struct HangingScanner;

impl DiscoveryScanner for HangingScanner {
    fn default_timeout(&self) -> Duration {
        SCANNER_DEFAULT_TIMEOUT
    }

    async fn scan(
        &self,
        _target: Option<Ipv4Addr>,
        _timeout: Duration,
    ) -> Result<Vec<RawResponse>, ScanError> {
        std::future::pending().await
    }
}
