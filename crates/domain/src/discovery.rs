//! Discovery records: transient scan results awaiting provisioning.
//!
//! Devices answer a discovery broadcast with vendor JSON whose shape depends
//! on firmware version. [`normalize`] turns one raw response into the single
//! canonical [`DiscoveryRecord`], dispatching to one decoder per known
//! schema (see [`schema`]). Shapes that match no known schema are rejected.

pub mod schema;

use serde::{Deserialize, Serialize};

pub use schema::ResponseSchema;

/// One response received during a discovery scan, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// Address the response came from (dotted quad).
    pub address: String,
    /// Decoded JSON body of the response.
    pub payload: serde_json::Value,
}

impl RawResponse {
    #[must_use]
    pub fn new(address: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            address: address.into(),
            payload,
        }
    }
}

/// A device found on the network that is not yet registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    pub address: String,
    pub hardware_id: Option<String>,
    pub model_name: Option<String>,
    /// Untouched vendor payload, kept for diagnostics.
    #[serde(default)]
    pub raw_payload: serde_json::Value,
}

/// Why a raw response could not be turned into a [`DiscoveryRecord`].
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// The response did not carry a source address.
    #[error("discovery response has no address")]
    MissingAddress,

    /// The payload matches none of the known response schemas.
    #[error("unrecognised discovery response shape from {address}")]
    UnknownShape { address: String },

    /// The payload looked like a known schema but a field had the wrong type.
    #[error("malformed {schema} response from {address}")]
    Malformed {
        schema: ResponseSchema,
        address: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Normalize a raw discovery response into a [`DiscoveryRecord`].
///
/// # Errors
///
/// Returns [`NormalizeError`] when the address is missing or the payload
/// does not decode as any known [`ResponseSchema`].
pub fn normalize(raw: RawResponse) -> Result<DiscoveryRecord, NormalizeError> {
    let address = raw.address.trim();
    if address.is_empty() {
        return Err(NormalizeError::MissingAddress);
    }

    let Some(schema) = ResponseSchema::detect(&raw.payload) else {
        return Err(NormalizeError::UnknownShape {
            address: address.to_string(),
        });
    };

    let identity = schema
        .decode(&raw.payload)
        .map_err(|source| NormalizeError::Malformed {
            schema,
            address: address.to_string(),
            source,
        })?;

    Ok(DiscoveryRecord {
        address: address.to_string(),
        hardware_id: identity.hardware_id,
        model_name: identity.model_name,
        raw_payload: raw.payload,
    })
}
