//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod devices;
#[allow(clippy::missing_errors_doc)]
pub mod discovery;

use axum::Router;
use axum::routing::{get, post};

use onelight_app::ports::{AdapterFactory, BroadcastResolver, DeviceRegistry, DiscoveryScanner};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<R, F, S, B>() -> Router<AppState<R, F, S, B>>
where
    R: DeviceRegistry + Send + Sync + 'static,
    F: AdapterFactory + 'static,
    S: DiscoveryScanner + 'static,
    B: BroadcastResolver + 'static,
{
    Router::new()
        .route("/discovery", get(discovery::scan::<R, F, S, B>))
        .route(
            "/devices",
            get(devices::list::<R, F, S, B>).post(devices::provision::<R, F, S, B>),
        )
        .route("/devices/{id}", get(devices::get::<R, F, S, B>))
        .route("/devices/{id}/turn_on", post(devices::turn_on::<R, F, S, B>))
        .route("/devices/{id}/turn_off", post(devices::turn_off::<R, F, S, B>))
        .route("/devices/{id}/state", get(devices::state::<R, F, S, B>))
}
