//! Device: a smart plug registered against a user's account.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{OneLightError, ValidationError};
use crate::id::{DeviceId, OwnerId};
use crate::time::Timestamp;

/// Model recorded when discovery could not tell what the device is.
pub const UNKNOWN_MODEL: &str = "unknown";

/// Last observed relay position of a plug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerStatus {
    On,
    Off,
}

impl PowerStatus {
    /// Map a relay reading onto a status.
    #[must_use]
    pub fn from_is_on(is_on: bool) -> Self {
        if is_on { Self::On } else { Self::Off }
    }

    /// Persisted textual form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for PowerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

/// A registered device as stored by the registry.
///
/// `status` is `None` until the first successful control call or state read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub model: String,
    pub owner_id: OwnerId,
    pub address: Option<String>,
    pub hardware_id: Option<String>,
    pub status: Option<PowerStatus>,
    pub last_seen: Option<Timestamp>,
    pub provisioned: bool,
}

/// A device awaiting insertion; the registry assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDevice {
    pub name: String,
    pub model: String,
    pub owner_id: OwnerId,
    pub address: Option<String>,
    pub hardware_id: Option<String>,
    pub provisioned: bool,
}

impl NewDevice {
    /// Create a builder for constructing a [`NewDevice`].
    #[must_use]
    pub fn builder() -> NewDeviceBuilder {
        NewDeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`OneLightError::Validation`] when `name` or `model` is empty.
    pub fn validate(&self) -> Result<(), OneLightError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.model.is_empty() {
            return Err(ValidationError::EmptyModel.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`NewDevice`].
#[derive(Debug)]
pub struct NewDeviceBuilder {
    name: Option<String>,
    model: Option<String>,
    owner_id: OwnerId,
    address: Option<String>,
    hardware_id: Option<String>,
    provisioned: bool,
}

impl Default for NewDeviceBuilder {
    fn default() -> Self {
        Self {
            name: None,
            model: None,
            owner_id: OwnerId::INVALID,
            address: None,
            hardware_id: None,
            provisioned: false,
        }
    }
}

impl NewDeviceBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn owner_id(mut self, owner_id: OwnerId) -> Self {
        self.owner_id = owner_id;
        self
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn hardware_id(mut self, hardware_id: impl Into<String>) -> Self {
        self.hardware_id = Some(hardware_id.into());
        self
    }

    #[must_use]
    pub fn provisioned(mut self, provisioned: bool) -> Self {
        self.provisioned = provisioned;
        self
    }

    /// Consume the builder, validate, and return a [`NewDevice`].
    ///
    /// A missing model falls back to [`UNKNOWN_MODEL`].
    ///
    /// # Errors
    ///
    /// Returns [`OneLightError::Validation`] if `name` is missing or empty.
    pub fn build(self) -> Result<NewDevice, OneLightError> {
        let device = NewDevice {
            name: self.name.unwrap_or_default(),
            model: self
                .model
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| UNKNOWN_MODEL.to_string()),
            owner_id: self.owner_id,
            address: self.address,
            hardware_id: self.hardware_id,
            provisioned: self.provisioned,
        };
        device.validate()?;
        Ok(device)
    }
}
