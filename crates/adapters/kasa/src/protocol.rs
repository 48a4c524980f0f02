//! Wire format of the legacy Kasa protocol.
//!
//! Every byte is XORed with the previous ciphertext byte, starting from a
//! fixed key. TCP frames carry a big-endian `u32` length prefix; UDP
//! datagrams do not.

use serde::Deserialize;
use serde_json::Value;

use crate::error::KasaError;

/// Seed of the autokey cipher.
pub const INITIAL_KEY: u8 = 171;

/// Largest response body accepted from a plug.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Query for the plug's system information; also the discovery probe.
pub const GET_SYSINFO: &str = r#"{"system":{"get_sysinfo":{}}}"#;

#[must_use]
pub fn encrypt(plain: &[u8]) -> Vec<u8> {
    let mut key = INITIAL_KEY;
    plain
        .iter()
        .map(|&byte| {
            key ^= byte;
            key
        })
        .collect()
}

#[must_use]
pub fn decrypt(cipher: &[u8]) -> Vec<u8> {
    let mut key = INITIAL_KEY;
    cipher
        .iter()
        .map(|&byte| {
            let plain = key ^ byte;
            key = byte;
            plain
        })
        .collect()
}

/// Encrypt `command` and prepend its length, ready for a TCP stream.
///
/// # Errors
///
/// Returns [`KasaError::FrameTooLarge`] when the command exceeds
/// [`MAX_FRAME_LEN`].
pub fn frame(command: &str) -> Result<Vec<u8>, KasaError> {
    let len = command.len();
    let prefix = u32::try_from(len)
        .ok()
        .filter(|_| len <= MAX_FRAME_LEN)
        .ok_or(KasaError::FrameTooLarge(len))?;

    let mut framed = Vec::with_capacity(4 + len);
    framed.extend_from_slice(&prefix.to_be_bytes());
    framed.extend(encrypt(command.as_bytes()));
    Ok(framed)
}

/// Command closing (`true`) or opening (`false`) the relay.
#[must_use]
pub fn set_relay_state(on: bool) -> String {
    serde_json::json!({ "system": { "set_relay_state": { "state": u8::from(on) } } }).to_string()
}

/// The subset of `get_sysinfo` a plug adapter cares about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SysInfo {
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, alias = "mic_mac")]
    pub mac: String,
    #[serde(default)]
    pub relay_state: Option<u8>,
}

impl SysInfo {
    /// Relay position, when the device has a relay.
    #[must_use]
    pub fn is_on(&self) -> Option<bool> {
        self.relay_state.map(|state| state != 0)
    }
}

/// Extract the system info from a `get_sysinfo` answer.
///
/// # Errors
///
/// Returns [`KasaError`] when the section is missing, carries a non-zero
/// `err_code`, or does not decode.
pub fn sysinfo(response: &Value) -> Result<SysInfo, KasaError> {
    let section = section(response, "get_sysinfo")?;
    Ok(SysInfo::deserialize(section)?)
}

/// Check that the plug acknowledged `method`.
///
/// # Errors
///
/// Returns [`KasaError`] when the section is missing or carries a non-zero
/// `err_code`.
pub fn acknowledge(response: &Value, method: &'static str) -> Result<(), KasaError> {
    section(response, method).map(|_| ())
}

fn section<'a>(response: &'a Value, method: &'static str) -> Result<&'a Value, KasaError> {
    let section = response
        .get("system")
        .and_then(|system| system.get(method))
        .filter(|section| section.is_object())
        .ok_or(KasaError::MissingSection(method))?;

    match section.get("err_code").and_then(Value::as_i64).unwrap_or(0) {
        0 => Ok(section),
        err_code => Err(KasaError::Rejected { method, err_code }),
    }
}
