//! Kasa adapter error types.

use std::time::Duration;

use onelight_domain::error::AdapterError;

/// Errors specific to the Kasa adapter.
#[derive(Debug, thiserror::Error)]
pub enum KasaError {
    /// Connecting, writing, or reading failed.
    #[error("I/O error talking to the plug")]
    Io(#[from] std::io::Error),

    /// A transport stage did not finish within the command timeout.
    #[error("{stage} timed out after {timeout:?}")]
    Timeout {
        stage: &'static str,
        timeout: Duration,
    },

    /// A frame length does not fit the protocol.
    #[error("frame of {0} bytes exceeds the protocol limit")]
    FrameTooLarge(usize),

    /// The plug answered with something that is not JSON.
    #[error("plug sent invalid JSON")]
    Json(#[from] serde_json::Error),

    /// The answer lacks the section for the method that was called.
    #[error("response has no system.{0} section")]
    MissingSection(&'static str),

    /// The plug answered with a non-zero `err_code`.
    #[error("plug rejected {method} with err_code {err_code}")]
    Rejected { method: &'static str, err_code: i64 },

    /// The plug's system info carries no relay state (not a plug).
    #[error("plug did not report a relay state")]
    NoRelayState,
}

impl KasaError {
    /// Whether the plug could not be reached at all.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Timeout { .. })
    }

    /// Convert into the port-level [`AdapterError`] for the plug at `address`.
    #[must_use]
    pub fn into_adapter_error(self, address: &str) -> AdapterError {
        let address = address.to_string();
        match self {
            Self::Io(source) => AdapterError::Unreachable { address, source },
            Self::Timeout { stage, timeout } => AdapterError::Unreachable {
                address,
                source: std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("{stage} timed out after {timeout:?}"),
                ),
            },
            other => AdapterError::Protocol {
                address,
                reason: other.to_string(),
            },
        }
    }
}
