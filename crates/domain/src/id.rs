//! Typed identifier newtypes backed by integer row ids.
//!
//! Identifiers are assigned by the registry. Only strictly positive values
//! are valid; [`DeviceId::INVALID`] is the sentinel returned when
//! provisioning is rejected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Sentinel for "no such row".
            pub const INVALID: Self = Self(-1);

            /// Wrap a raw row id.
            #[must_use]
            pub const fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            /// Access the inner row id.
            #[must_use]
            pub const fn as_raw(self) -> i64 {
                self.0
            }

            /// Whether this id can refer to a stored row.
            #[must_use]
            pub const fn is_valid(self) -> bool {
                self.0 > 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a registered [`Device`](crate::device::Device).
    DeviceId
);

define_id!(
    /// Identifier of the user account owning a device.
    OwnerId
);
