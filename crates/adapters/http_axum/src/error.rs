//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use onelight_domain::error::OneLightError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Everything a handler can fail with, mapped to a status code.
#[derive(Debug)]
pub enum ApiError {
    /// An application error.
    Domain(OneLightError),
    /// The request itself is malformed (bad path id, bad query).
    BadRequest(String),
    /// The caller did not identify itself.
    Unauthorized,
    /// The device manager returned the invalid id for a provisioning request.
    ProvisionRejected,
}

impl From<OneLightError> for ApiError {
    fn from(err: OneLightError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Domain(err) => match &err {
                OneLightError::Validation(inner) => (StatusCode::BAD_REQUEST, inner.to_string()),
                OneLightError::DeviceNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                OneLightError::MissingAddress(_) => (StatusCode::CONFLICT, err.to_string()),
                OneLightError::Adapter(inner) => {
                    tracing::warn!(error = %inner, "device command failed");
                    (StatusCode::BAD_GATEWAY, inner.to_string())
                }
                OneLightError::Storage(inner) => {
                    tracing::error!(error = %inner, "storage error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                    )
                }
            },
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "missing or invalid owner".to_string(),
            ),
            Self::ProvisionRejected => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "device could not be provisioned".to_string(),
            ),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
