//! Known discovery response schemas and their decoders.
//!
//! | Schema | Shape |
//! |--------|-------|
//! | [`Canonical`](ResponseSchema::Canonical) | `{"hardware_id", "model_name", "address"?}` |
//! | [`LegacyFlat`](ResponseSchema::LegacyFlat) | `{"mac", "model"}` |
//! | [`SysInfo`](ResponseSchema::SysInfo) | `{"sys_info": {"mac" \| "mic_mac", "model"}}` |
//! | [`KasaWire`](ResponseSchema::KasaWire) | `{"system": {"get_sysinfo": {"mac" \| "mic_mac", "model"}}}` |

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

/// A discovery response format this crate knows how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSchema {
    Canonical,
    LegacyFlat,
    SysInfo,
    KasaWire,
}

/// Identity fields extracted from a response.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Identity {
    pub hardware_id: Option<String>,
    pub model_name: Option<String>,
}

impl ResponseSchema {
    /// Pick the schema matching `payload`, if any.
    ///
    /// Nested shapes are checked first so that a wire response that also
    /// happens to carry a top-level `model` key is decoded from its
    /// `get_sysinfo` block.
    #[must_use]
    pub fn detect(payload: &Value) -> Option<Self> {
        let object = payload.as_object()?;

        if payload.pointer("/system/get_sysinfo").is_some_and(Value::is_object) {
            return Some(Self::KasaWire);
        }
        if object.get("sys_info").is_some_and(Value::is_object) {
            return Some(Self::SysInfo);
        }
        if object.contains_key("hardware_id") || object.contains_key("model_name") {
            return Some(Self::Canonical);
        }
        if object.contains_key("mac") || object.contains_key("model") {
            return Some(Self::LegacyFlat);
        }
        None
    }

    /// Decode the identity fields of `payload` according to this schema.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] when a field has an unexpected type.
    pub fn decode(self, payload: &Value) -> Result<Identity, serde_json::Error> {
        match self {
            Self::Canonical => decode_canonical(payload),
            Self::LegacyFlat => decode_legacy_flat(payload),
            Self::SysInfo => decode_sys_info(payload),
            Self::KasaWire => decode_kasa_wire(payload),
        }
    }
}

impl fmt::Display for ResponseSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Canonical => "canonical",
            Self::LegacyFlat => "legacy flat",
            Self::SysInfo => "sys_info",
            Self::KasaWire => "kasa wire",
        })
    }
}

#[derive(Deserialize)]
struct CanonicalBody {
    hardware_id: Option<String>,
    model_name: Option<String>,
}

#[derive(Deserialize)]
struct LegacyFlatBody {
    mac: Option<String>,
    model: Option<String>,
}

/// `get_sysinfo` block. Plugs report `mac`; some newer models report
/// `mic_mac` as twelve bare hex digits instead.
#[derive(Deserialize)]
struct SysInfoBody {
    mac: Option<String>,
    mic_mac: Option<String>,
    model: Option<String>,
}

#[derive(Deserialize)]
struct SysInfoEnvelope {
    sys_info: SysInfoBody,
}

#[derive(Deserialize)]
struct KasaWireEnvelope {
    system: KasaSystem,
}

#[derive(Deserialize)]
struct KasaSystem {
    get_sysinfo: SysInfoBody,
}

fn decode_canonical(payload: &Value) -> Result<Identity, serde_json::Error> {
    let body = CanonicalBody::deserialize(payload)?;
    Ok(Identity {
        hardware_id: non_empty(body.hardware_id),
        model_name: non_empty(body.model_name),
    })
}

fn decode_legacy_flat(payload: &Value) -> Result<Identity, serde_json::Error> {
    let body = LegacyFlatBody::deserialize(payload)?;
    Ok(Identity {
        hardware_id: non_empty(body.mac),
        model_name: non_empty(body.model),
    })
}

fn decode_sys_info(payload: &Value) -> Result<Identity, serde_json::Error> {
    let envelope = SysInfoEnvelope::deserialize(payload)?;
    Ok(envelope.sys_info.into_identity())
}

fn decode_kasa_wire(payload: &Value) -> Result<Identity, serde_json::Error> {
    let envelope = KasaWireEnvelope::deserialize(payload)?;
    Ok(envelope.system.get_sysinfo.into_identity())
}

impl SysInfoBody {
    fn into_identity(self) -> Identity {
        let hardware_id = non_empty(self.mac).or_else(|| non_empty(self.mic_mac).map(colon_mac));
        Identity {
            hardware_id,
            model_name: non_empty(self.model),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Format twelve bare hex digits as `AA:BB:CC:DD:EE:FF`; anything else is
/// returned unchanged.
fn colon_mac(raw: String) -> String {
    if raw.len() != 12 || !raw.chars().all(|c| c.is_ascii_hexdigit()) {
        return raw;
    }
    raw.as_bytes()
        .chunks(2)
        .map(|pair| String::from_utf8_lossy(pair).to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join(":")
}
