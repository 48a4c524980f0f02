//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use onelight_domain::id::{DeviceId, OwnerId};

use crate::error::ApiError;

/// Header carrying the authenticated account id, set by the session layer
/// in front of this service.
pub const OWNER_HEADER: &str = "x-onelight-owner";

/// The account on whose behalf the request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(pub OwnerId);

impl<S: Send + Sync> FromRequestParts<S> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<OwnerId>().ok())
            .filter(|owner| owner.is_valid())
            .map(Owner)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Parse a device id taken from the URL path.
///
/// # Errors
///
/// Returns [`ApiError::BadRequest`] when `raw` is not a valid id.
pub fn device_id(raw: &str) -> Result<DeviceId, ApiError> {
    raw.parse::<DeviceId>()
        .ok()
        .filter(|id| id.is_valid())
        .ok_or_else(|| ApiError::BadRequest(format!("invalid device id {raw:?}")))
}
