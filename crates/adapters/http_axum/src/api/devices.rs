//! JSON REST handlers for registered devices.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use onelight_app::ports::{AdapterFactory, BroadcastResolver, DeviceRegistry, DiscoveryScanner};
use onelight_domain::device::{Device, PowerStatus};
use onelight_domain::discovery::DiscoveryRecord;
use onelight_domain::error::OneLightError;
use onelight_domain::id::{DeviceId, OwnerId};
use onelight_domain::state::PlugState;

use crate::error::ApiError;
use crate::extract::{Owner, device_id};
use crate::state::AppState;

/// Request body for provisioning a discovered device.
#[derive(Deserialize)]
pub struct ProvisionRequest {
    pub name: String,
    pub record: DiscoveryRecord,
}

#[derive(Debug, Serialize)]
pub struct Provisioned {
    pub id: DeviceId,
}

/// Body returned after a successful switch.
#[derive(Debug, Serialize)]
pub struct Switched {
    pub id: DeviceId,
    pub status: PowerStatus,
}

/// Possible responses from the provision endpoint.
pub enum ProvisionResponse {
    Created(Json<Provisioned>),
}

impl IntoResponse for ProvisionResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `GET /api/devices`
pub async fn list<R, F, S, B>(
    State(state): State<AppState<R, F, S, B>>,
    Owner(owner): Owner,
) -> Result<Json<Vec<Device>>, ApiError>
where
    R: DeviceRegistry + Send + Sync + 'static,
    F: AdapterFactory + 'static,
    S: DiscoveryScanner + 'static,
    B: BroadcastResolver + 'static,
{
    let devices = state.manager.list_devices(owner).await?;
    Ok(Json(devices))
}

/// `POST /api/devices`
pub async fn provision<R, F, S, B>(
    State(state): State<AppState<R, F, S, B>>,
    Owner(owner): Owner,
    Json(req): Json<ProvisionRequest>,
) -> Result<ProvisionResponse, ApiError>
where
    R: DeviceRegistry + Send + Sync + 'static,
    F: AdapterFactory + 'static,
    S: DiscoveryScanner + 'static,
    B: BroadcastResolver + 'static,
{
    let id = state.manager.provision(&req.record, owner, &req.name).await;
    if !id.is_valid() {
        return Err(ApiError::ProvisionRejected);
    }
    Ok(ProvisionResponse::Created(Json(Provisioned { id })))
}

/// `GET /api/devices/{id}`
pub async fn get<R, F, S, B>(
    State(state): State<AppState<R, F, S, B>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<Device>, ApiError>
where
    R: DeviceRegistry + Send + Sync + 'static,
    F: AdapterFactory + 'static,
    S: DiscoveryScanner + 'static,
    B: BroadcastResolver + 'static,
{
    let device = owned_device(&state, owner, &id).await?;
    Ok(Json(device))
}

/// `POST /api/devices/{id}/turn_on`
pub async fn turn_on<R, F, S, B>(
    State(state): State<AppState<R, F, S, B>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<Switched>, ApiError>
where
    R: DeviceRegistry + Send + Sync + 'static,
    F: AdapterFactory + 'static,
    S: DiscoveryScanner + 'static,
    B: BroadcastResolver + 'static,
{
    let device = owned_device(&state, owner, &id).await?;
    state.manager.turn_on(device.id).await?;
    Ok(Json(Switched {
        id: device.id,
        status: PowerStatus::On,
    }))
}

/// `POST /api/devices/{id}/turn_off`
pub async fn turn_off<R, F, S, B>(
    State(state): State<AppState<R, F, S, B>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<Switched>, ApiError>
where
    R: DeviceRegistry + Send + Sync + 'static,
    F: AdapterFactory + 'static,
    S: DiscoveryScanner + 'static,
    B: BroadcastResolver + 'static,
{
    let device = owned_device(&state, owner, &id).await?;
    state.manager.turn_off(device.id).await?;
    Ok(Json(Switched {
        id: device.id,
        status: PowerStatus::Off,
    }))
}

/// `GET /api/devices/{id}/state`
pub async fn state<R, F, S, B>(
    State(state): State<AppState<R, F, S, B>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<PlugState>, ApiError>
where
    R: DeviceRegistry + Send + Sync + 'static,
    F: AdapterFactory + 'static,
    S: DiscoveryScanner + 'static,
    B: BroadcastResolver + 'static,
{
    let device = owned_device(&state, owner, &id).await?;
    let plug_state = state.manager.get_state(device.id).await?;
    Ok(Json(plug_state))
}

// Devices of other owners are reported as missing, not forbidden.
async fn owned_device<R, F, S, B>(
    state: &AppState<R, F, S, B>,
    owner: OwnerId,
    raw_id: &str,
) -> Result<Device, ApiError>
where
    R: DeviceRegistry + Send + Sync + 'static,
    F: AdapterFactory + 'static,
    S: DiscoveryScanner + 'static,
    B: BroadcastResolver + 'static,
{
    let id = device_id(raw_id)?;
    let device = state.manager.get_device(id).await?;
    if device.owner_id != owner {
        return Err(OneLightError::DeviceNotFound(id).into());
    }
    Ok(device)
}
