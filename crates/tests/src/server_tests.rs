//! HTTP boundary tests: the axum router driven with `tower::ServiceExt::oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use balance_core::{metrics::MetricsCollector, proxy::ProxyEngine};
use serde_json::Value;
use server::{create_app, AppState};
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;

use crate::mock_infrastructure::{build_registry, RecordingMetrics, RpcMockBuilder, TEST_ADDRESS};

fn app_for(
    endpoints: &[(&str, String)],
    metrics: Option<Arc<MetricsCollector>>,
) -> (Router, AppState) {
    let sink = RecordingMetrics::new();
    let registry = build_registry(endpoints, sink.clone());
    let state = AppState {
        proxy_engine: Arc::new(ProxyEngine::new(registry, sink)),
        metrics,
        request_timeout: Duration::from_secs(5),
    };
    (create_app(state.clone()), state)
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test]
async fn test_balance_returns_decimal_string() {
    let mut upstream = RpcMockBuilder::new().await;
    upstream.mock_balance(1_500_000_000_000_000_000).await;
    let (app, _) = app_for(&[("node", upstream.url())], None);

    let (status, body) = get_json(app, &format!("/eth/balance/{TEST_ADDRESS}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "1500000000000000000");
}

#[tokio::test]
async fn test_balance_beyond_u128() {
    let mut upstream = RpcMockBuilder::new().await;
    upstream.mock_balance_hex(&format!("0x1{}", "0".repeat(32))).await;
    let (app, _) = app_for(&[("node", upstream.url())], None);

    let (status, body) = get_json(app, &format!("/eth/balance/{TEST_ADDRESS}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "340282366920938463463374607431768211456");
}

#[tokio::test]
async fn test_block_selector_is_normalised() {
    let mut upstream = RpcMockBuilder::new().await;
    upstream.mock_balance_at(TEST_ADDRESS, "0x10", 3).await;
    let (app, _) = app_for(&[("node", upstream.url())], None);

    let uppercase = TEST_ADDRESS.to_uppercase().replacen("0X", "0x", 1);
    let (status, body) = get_json(app, &format!("/eth/balance/{uppercase}?block=16")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "3");
    upstream.assert_all().await;
}

#[tokio::test]
async fn test_invalid_address_is_rejected_before_dispatch() {
    let mut upstream = RpcMockBuilder::new().await;
    upstream.expect_no_requests().await;
    let (app, _) = app_for(&[("node", upstream.url())], None);

    let (status, body) = get_json(app, "/eth/balance/0xnot-an-address").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid Ethereum address"));
    upstream.assert_all().await;
}

#[tokio::test]
async fn test_all_failed_is_service_unavailable() {
    let mut upstream = RpcMockBuilder::new().await;
    upstream.mock_http_status("eth_getBalance", 500).await;
    let (app, _) = app_for(&[("node", upstream.url())], None);

    let (status, body) = get_json(app, &format!("/eth/balance/{TEST_ADDRESS}")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_health_endpoints() {
    let upstream = RpcMockBuilder::new().await;
    let (app, state) = app_for(&[("node", upstream.url())], None);

    let (status, body) = get_json(app.clone(), "/health/live").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");

    let (status, body) = get_json(app.clone(), "/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");

    state.proxy_engine.registry().set_availability("node", false);
    let (status, body) = get_json(app, "/health/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "not ready");
    assert_eq!(body["message"], "no clients available");
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_http_and_client_metrics() {
    let mut upstream = RpcMockBuilder::new().await;
    upstream.mock_balance(1).await;
    let collector = Arc::new(MetricsCollector::new());

    let registry = build_registry(&[("metrics-node", upstream.url())], collector.clone());
    let state = AppState {
        proxy_engine: Arc::new(ProxyEngine::new(registry, collector.clone())),
        metrics: Some(collector),
        request_timeout: Duration::from_secs(5),
    };
    let app = create_app(state);

    let (status, _) = get(app.clone(), &format!("/eth/balance/{TEST_ADDRESS}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("http_requests_total"));
    assert!(body.contains("endpoint=\"/eth/balance/{address}\""));
    assert!(body.contains("client_availability"));
}

#[tokio::test]
async fn test_metrics_route_absent_when_disabled() {
    let upstream = RpcMockBuilder::new().await;
    let (app, _) = app_for(&[("node", upstream.url())], None);

    let (status, _) = get(app, "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
