//! Kasa smart plug adapter.

use std::time::Duration;

use onelight_app::ports::{AdapterFactory, PlugAdapter};
use onelight_domain::error::AdapterError;
use onelight_domain::state::PlugState;

use crate::config::KasaConfig;
use crate::error::KasaError;
use crate::protocol::{self, SysInfo};
use crate::transport::Transport;

/// One Kasa plug reached over TCP.
///
/// The session is the last system info read from the plug; it is fetched on
/// first use and refreshed by [`connect_or_refresh`](PlugAdapter::connect_or_refresh)
/// and every state read.
#[derive(Debug)]
pub struct KasaPlug {
    transport: Transport,
    sysinfo: Option<SysInfo>,
}

impl KasaPlug {
    #[must_use]
    pub fn new(address: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            transport: Transport::new(address, port, timeout),
            sysinfo: None,
        }
    }

    /// System info from the last refresh, if any.
    #[must_use]
    pub fn sysinfo(&self) -> Option<&SysInfo> {
        self.sysinfo.as_ref()
    }

    async fn refresh(&mut self) -> Result<&SysInfo, KasaError> {
        let response = self.transport.request(protocol::GET_SYSINFO).await?;
        let info = protocol::sysinfo(&response)?;
        tracing::debug!(address = %self.transport.address(), model = %info.model, alias = %info.alias, "sysinfo refreshed");
        Ok(self.sysinfo.insert(info))
    }

    async fn set_relay(&mut self, on: bool) -> Result<(), KasaError> {
        if self.sysinfo.is_none() {
            self.refresh().await?;
        }
        let response = self.transport.request(&protocol::set_relay_state(on)).await?;
        protocol::acknowledge(&response, "set_relay_state")?;

        if let Some(info) = &mut self.sysinfo {
            info.relay_state = Some(u8::from(on));
        }
        Ok(())
    }

    async fn relay_state(&mut self) -> Result<PlugState, KasaError> {
        let info = self.refresh().await?;
        let is_on = info.is_on().ok_or(KasaError::NoRelayState)?;
        Ok(PlugState { is_on })
    }

    fn adapter_error(&self, err: KasaError) -> AdapterError {
        err.into_adapter_error(self.transport.address())
    }
}

impl PlugAdapter for KasaPlug {
    fn address(&self) -> &str {
        self.transport.address()
    }

    async fn connect_or_refresh(&mut self) -> Result<(), AdapterError> {
        self.refresh()
            .await
            .map(|_| ())
            .map_err(|err| self.adapter_error(err))
    }

    async fn turn_on(&mut self) -> Result<(), AdapterError> {
        self.set_relay(true).await.map_err(|err| self.adapter_error(err))
    }

    async fn turn_off(&mut self) -> Result<(), AdapterError> {
        self.set_relay(false).await.map_err(|err| self.adapter_error(err))
    }

    async fn read_state(&mut self) -> Result<PlugState, AdapterError> {
        self.relay_state().await.map_err(|err| self.adapter_error(err))
    }
}

/// Builds [`KasaPlug`]s sharing one port and command timeout.
#[derive(Debug, Clone)]
pub struct KasaAdapterFactory {
    port: u16,
    command_timeout: Duration,
}

impl KasaAdapterFactory {
    #[must_use]
    pub fn new(config: &KasaConfig) -> Self {
        Self {
            port: config.port,
            command_timeout: config.command_timeout(),
        }
    }
}

impl AdapterFactory for KasaAdapterFactory {
    type Adapter = KasaPlug;

    fn create(&self, address: &str) -> KasaPlug {
        KasaPlug::new(address, self.port, self.command_timeout)
    }
}
