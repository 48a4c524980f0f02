//! Plug state: the normalized view of a plug's relay returned to callers.

use serde::{Deserialize, Serialize};

use crate::device::PowerStatus;

/// State reported by a device adapter.
///
/// The default value (`is_on = false`) is what callers see when a state
/// read fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlugState {
    pub is_on: bool,
}

impl PlugState {
    #[must_use]
    pub fn on() -> Self {
        Self { is_on: true }
    }

    #[must_use]
    pub fn off() -> Self {
        Self { is_on: false }
    }

    /// Status to persist for this observation.
    #[must_use]
    pub fn status(self) -> PowerStatus {
        PowerStatus::from_is_on(self.is_on)
    }
}
