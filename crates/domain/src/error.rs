//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`OneLightError`] via `From` when crossing a port boundary.

use crate::id::DeviceId;

/// Top-level error returned by application services.
#[derive(Debug, thiserror::Error)]
pub enum OneLightError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The operation referenced a device id that is not registered.
    #[error("device {0} not found")]
    DeviceNotFound(DeviceId),

    /// The registered device has no network address to talk to.
    #[error("device {0} has no network address")]
    MissingAddress(DeviceId),

    /// The physical device did not carry out a command.
    #[error("device command failed")]
    Adapter(#[from] AdapterError),

    /// Persistence failed. The source is adapter specific.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Invariant violations detected while building domain values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("model must not be empty")]
    EmptyModel,

    #[error("address must not be empty")]
    EmptyAddress,

    #[error("unknown power status {0:?}")]
    UnknownStatus(String),
}

/// Failures reported by a device adapter while talking to a plug.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// The device could not be reached (connect, I/O, or timeout).
    #[error("device at {address} is unreachable")]
    Unreachable {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The device answered, but not with an acknowledgement.
    #[error("device at {address} rejected the command: {reason}")]
    Protocol { address: String, reason: String },
}

impl AdapterError {
    /// Whether the error means the device could not be reached at all.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}
