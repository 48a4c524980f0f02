//! # onelight-domain
//!
//! Pure domain model for the onelight smart-plug controller.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** (registered smart plugs owned by a user)
//! - Define **Discovery records** (transient scan results awaiting provisioning)
//! - Define **Plug state** (the normalized view of a plug's relay)
//! - Normalize vendor discovery responses into a single canonical record
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod discovery;
pub mod state;
