//! Adapter port: the control surface of one physical plug.
//!
//! Each vendor protocol provides one [`PlugAdapter`] implementation and an
//! [`AdapterFactory`] that binds adapters to addresses. The application
//! layer only ever sees these traits.

use std::future::Future;

use onelight_domain::error::AdapterError;
use onelight_domain::state::PlugState;

/// Live connection to a single plug.
///
/// Methods take `&mut self`: an adapter is driven by one caller at a time,
/// and the cache hands it out behind a per-device lock.
pub trait PlugAdapter: Send {
    /// Address this adapter talks to.
    fn address(&self) -> &str;

    /// Establish the session with the plug, or refresh it when one exists.
    ///
    /// Idempotent; repeated calls must not open new connections needlessly.
    fn connect_or_refresh(&mut self) -> impl Future<Output = Result<(), AdapterError>> + Send;

    /// Close the relay. Does not touch persisted state.
    fn turn_on(&mut self) -> impl Future<Output = Result<(), AdapterError>> + Send;

    /// Open the relay. Does not touch persisted state.
    fn turn_off(&mut self) -> impl Future<Output = Result<(), AdapterError>> + Send;

    /// Read the current relay state, reporting failures.
    fn read_state(&mut self) -> impl Future<Output = Result<PlugState, AdapterError>> + Send;

    /// Read the current relay state, degrading to "off" on any failure.
    ///
    /// Unlike [`turn_on`](Self::turn_on) and [`turn_off`](Self::turn_off),
    /// failures are logged and swallowed so that status displays keep working
    /// while a plug is unreachable.
    fn get_state(&mut self) -> impl Future<Output = PlugState> + Send {
        async move {
            match self.read_state().await {
                Ok(state) => state,
                Err(err) => {
                    tracing::warn!(address = %self.address(), error = %err, "state read failed, reporting off");
                    PlugState::default()
                }
            }
        }
    }
}

/// Builds adapters bound to a network address.
pub trait AdapterFactory: Send + Sync {
    type Adapter: PlugAdapter + 'static;

    /// Create an adapter for the plug at `address`. Must not perform I/O.
    fn create(&self, address: &str) -> Self::Adapter;
}
