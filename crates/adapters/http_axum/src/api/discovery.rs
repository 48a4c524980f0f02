//! JSON REST handler for network discovery.

use std::time::Duration;

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use onelight_app::ports::{AdapterFactory, BroadcastResolver, DeviceRegistry, DiscoveryScanner};
use onelight_domain::discovery::DiscoveryRecord;

use crate::error::ApiError;
use crate::extract::Owner;
use crate::state::AppState;

/// Longest scan a request may ask for.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default, Deserialize)]
pub struct DiscoveryQuery {
    /// Scan duration in seconds; the configured default when absent.
    pub timeout_secs: Option<u64>,
}

/// `GET /api/discovery`
///
/// Lists unregistered devices answering a scan. Never fails because of the
/// network: a failed scan is an empty list.
pub async fn scan<R, F, S, B>(
    State(state): State<AppState<R, F, S, B>>,
    Owner(owner): Owner,
    Query(query): Query<DiscoveryQuery>,
) -> Result<Json<Vec<DiscoveryRecord>>, ApiError>
where
    R: DeviceRegistry + Send + Sync + 'static,
    F: AdapterFactory + 'static,
    S: DiscoveryScanner + 'static,
    B: BroadcastResolver + 'static,
{
    let timeout = match query.timeout_secs {
        Some(0) => return Err(ApiError::BadRequest("timeout_secs must be positive".into())),
        Some(secs) => Duration::from_secs(secs).min(MAX_TIMEOUT),
        None => state.discovery_timeout,
    };

    tracing::debug!(%owner, ?timeout, "discovery requested");
    let records = state.manager.discover(timeout).await;
    Ok(Json(records))
}
