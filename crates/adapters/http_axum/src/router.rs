//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use onelight_app::ports::{AdapterFactory, BroadcastResolver, DeviceRegistry, DiscoveryScanner};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api`. Includes a [`TraceLayer`] that logs each
/// HTTP request/response at the `DEBUG` level using the `tracing` ecosystem.
pub fn build<R, F, S, B>(state: AppState<R, F, S, B>) -> Router
where
    R: DeviceRegistry + Send + Sync + 'static,
    F: AdapterFactory + 'static,
    S: DiscoveryScanner + 'static,
    B: BroadcastResolver + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::extract::OWNER_HEADER;
    use crate::testing::{self, TestState};

    const OWNER: &str = "7";

    fn app(state: TestState) -> Router {
        build(state)
    }

    fn request(method: &str, uri: &str, owner: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(owner) = owner {
            builder = builder.header(OWNER_HEADER, owner);
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(router: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn provision_body(address: &str) -> Value {
        json!({
            "name": "Desk lamp",
            "record": {
                "address": address,
                "hardware_id": "AA:BB:CC:DD:EE:FF",
                "model_name": "PlugX"
            }
        })
    }

    async fn provisioned(state: &TestState, owner: &str, address: &str) -> i64 {
        let (status, body) = send(
            app(state.clone()),
            request("POST", "/api/devices", Some(owner), Some(provision_body(address))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let response = app(testing::state())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_reject_api_calls_without_owner() {
        let (status, body) = send(app(testing::state()), request("GET", "/api/devices", None, None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn should_list_discovered_devices() {
        let (status, body) = send(
            app(testing::state()),
            request("GET", "/api/discovery?timeout_secs=1", Some(OWNER), None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["address"], "192.168.1.50");
        assert_eq!(body[0]["hardware_id"], "AA:BB:CC:DD:EE:FF");
        assert_eq!(body[0]["model_name"], "PlugX");
    }

    #[tokio::test]
    async fn should_reject_zero_discovery_timeout() {
        let (status, _) = send(
            app(testing::state()),
            request("GET", "/api/discovery?timeout_secs=0", Some(OWNER), None),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_provision_then_list_device() {
        let state = testing::state();
        let id = provisioned(&state, OWNER, "192.168.1.50").await;

        let (status, body) = send(app(state), request("GET", "/api/devices", Some(OWNER), None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["id"], id);
        assert_eq!(body[0]["model"], "PlugX");
        assert_eq!(body[0]["provisioned"], true);
    }

    #[tokio::test]
    async fn should_return_unprocessable_when_provisioning_rejected() {
        let (status, _) = send(
            app(testing::state()),
            request(
                "POST",
                "/api/devices",
                Some(OWNER),
                Some(json!({
                    "name": "",
                    "record": { "address": "192.168.1.50" }
                })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn should_turn_on_and_report_state() {
        let state = testing::state();
        let id = provisioned(&state, OWNER, "192.168.1.50").await;

        let (status, body) = send(
            app(state.clone()),
            request("POST", &format!("/api/devices/{id}/turn_on"), Some(OWNER), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "id": id, "status": "on" }));

        let (status, body) = send(
            app(state.clone()),
            request("GET", &format!("/api/devices/{id}/state"), Some(OWNER), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "is_on": true }));

        let (_, device) = send(
            app(state),
            request("GET", &format!("/api/devices/{id}"), Some(OWNER), None),
        )
        .await;
        assert_eq!(device["status"], "on");
        assert!(device["last_seen"].is_string());
    }

    #[tokio::test]
    async fn should_hide_devices_of_other_owners() {
        let state = testing::state();
        let id = provisioned(&state, OWNER, "192.168.1.50").await;

        let (status, _) = send(
            app(state),
            request("POST", &format!("/api/devices/{id}/turn_on"), Some("8"), None),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_return_not_found_when_device_unknown() {
        let (status, body) = send(
            app(testing::state()),
            request("GET", "/api/devices/999/state", Some(OWNER), None),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "device 999 not found");
    }

    #[tokio::test]
    async fn should_return_bad_request_when_id_invalid() {
        let (status, _) = send(
            app(testing::state()),
            request("GET", "/api/devices/lamp", Some(OWNER), None),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_return_bad_gateway_when_plug_unreachable() {
        let state = testing::unreachable_state();
        let id = provisioned(&state, OWNER, "192.168.1.50").await;

        let (status, _) = send(
            app(state),
            request("POST", &format!("/api/devices/{id}/turn_off"), Some(OWNER), None),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn should_use_configured_timeout_when_query_omits_it() {
        let state = testing::state();
        assert_eq!(state.discovery_timeout, Duration::from_millis(10));

        let (status, body) = send(
            app(state),
            request("GET", "/api/discovery", Some(OWNER), None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.is_array());
    }
}
