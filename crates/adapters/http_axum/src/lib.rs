//! # onelight-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** over the device manager
//!   (`/api/discovery`, `/api/devices`, `/api/devices/{id}/turn_on`, …)
//! - Resolve the calling owner and hide devices that belong to others
//! - Map application errors onto HTTP status codes
//!
//! ## Dependency rule
//! Depends on `onelight-app` (for port traits and services) and `onelight-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod extract;
pub mod router;
pub mod state;

#[cfg(test)]
mod testing;
