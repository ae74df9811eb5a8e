//! Integration tests for `HealthMonitor` and its interaction with the fan-out.

use balance_core::{
    proxy::ProxyEngine,
    upstream::{BalanceError, FailureReason, HealthMonitor},
    utils::BlockSelector,
};
use serde_json::json;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::mock_infrastructure::{
    build_registry, test_address, RecordingMetrics, RpcMockBuilder, StalledUpstream,
};

#[tokio::test]
async fn test_sweep_applies_each_outcome() {
    let mut healthy = RpcMockBuilder::new().await;
    healthy.mock_block_number(19_000_000).await;
    let mut rpc_error = RpcMockBuilder::new().await;
    rpc_error.mock_rpc_error("eth_blockNumber", -32601, "method not found").await;
    let mut null_error = RpcMockBuilder::new().await;
    null_error
        .mock_raw_body(
            "eth_blockNumber",
            &json!({"jsonrpc": "2.0", "id": 1, "result": "0x1", "error": null}),
        )
        .await;
    let mut not_object = RpcMockBuilder::new().await;
    not_object.mock_raw_body("eth_blockNumber", &json!([{"result": "0x1"}])).await;

    let metrics = RecordingMetrics::new();
    let registry = build_registry(
        &[
            ("healthy", healthy.url()),
            ("rpc-error", rpc_error.url()),
            ("null-error", null_error.url()),
            ("not-object", not_object.url()),
        ],
        metrics.clone(),
    );
    let monitor = HealthMonitor::new(registry.clone(), metrics.clone());

    monitor.check_all().wait().await;

    assert_eq!(registry.is_available("healthy"), Some(true));
    assert_eq!(registry.is_available("rpc-error"), Some(false));
    assert_eq!(registry.is_available("null-error"), Some(false));
    assert_eq!(registry.is_available("not-object"), Some(false));
    assert_eq!(metrics.last_gauge("healthy"), Some(true));
    assert_eq!(metrics.last_gauge("rpc-error"), Some(false));
    assert!(metrics.failures().is_empty(), "protocol failures are not counted as health_check");
}

#[tokio::test]
async fn test_check_all_does_not_wait_for_slow_probes() {
    let stalled = StalledUpstream::start().await;
    let mut healthy = RpcMockBuilder::new().await;
    healthy.mock_block_number(1).await;

    let metrics = RecordingMetrics::new();
    let registry =
        build_registry(&[("stalled", stalled.url()), ("healthy", healthy.url())], metrics.clone());
    registry.set_availability("healthy", false);
    let monitor = HealthMonitor::new(registry.clone(), metrics.clone())
        .with_probe_timeout(Duration::from_millis(500));

    let sweep = monitor.check_all();
    assert_eq!(
        registry.is_available("stalled"),
        Some(true),
        "check_all waited for the stalled probe"
    );

    let deadline = tokio::time::Instant::now() + Duration::from_millis(400);
    while registry.is_available("healthy") != Some(true) {
        assert!(tokio::time::Instant::now() < deadline, "fast probe was held up by the slow one");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(registry.is_available("stalled"), Some(true));

    sweep.wait().await;
    assert_eq!(registry.is_available("stalled"), Some(false));
    assert_eq!(metrics.failures_for("stalled"), [FailureReason::HealthCheck]);
}

#[tokio::test]
async fn test_dropped_sweep_still_completes() {
    let mut broken = RpcMockBuilder::new().await;
    broken.mock_http_status("eth_blockNumber", 500).await;

    let metrics = RecordingMetrics::new();
    let registry = build_registry(&[("broken", broken.url())], metrics.clone());
    let monitor = HealthMonitor::new(registry.clone(), metrics);

    drop(monitor.check_all());

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while registry.is_available("broken") != Some(false) {
        assert!(tokio::time::Instant::now() < deadline, "detached probe never finished");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_unavailable_endpoints_are_excluded_from_queries() {
    let mut healthy = RpcMockBuilder::new().await;
    healthy.mock_block_number(1).await;
    healthy.mock_balance(10).await;
    let mut unhealthy = RpcMockBuilder::new().await;
    unhealthy.mock_http_status("eth_blockNumber", 503).await;

    let metrics = RecordingMetrics::new();
    let registry = build_registry(
        &[("unhealthy", unhealthy.url()), ("healthy", healthy.url())],
        metrics.clone(),
    );
    let monitor = HealthMonitor::new(registry.clone(), metrics.clone());
    let engine = ProxyEngine::new(registry, metrics.clone());

    monitor.check_all().wait().await;
    let result = engine
        .get_balance_detailed(&test_address(), &BlockSelector::default(), Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(result.total_replies, 1);
    assert_eq!(&*result.groups[0].endpoints[0], "healthy");
}

#[tokio::test]
async fn test_driver_sweeps_until_shutdown() {
    let mut broken = RpcMockBuilder::new().await;
    broken.mock_http_status("eth_blockNumber", 500).await;

    let metrics = RecordingMetrics::new();
    let registry = build_registry(&[("broken", broken.url())], metrics.clone());
    let monitor = HealthMonitor::new(registry.clone(), metrics)
        .with_check_interval(Duration::from_millis(100));

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let driver = monitor.start_with_shutdown(shutdown_rx);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while registry.is_available("broken") != Some(false) {
        assert!(tokio::time::Instant::now() < deadline, "driver never swept");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    shutdown_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(1), driver)
        .await
        .expect("driver stops on shutdown")
        .unwrap();
}

/// Known gap: availability is driven only by the liveness probe. An endpoint that passes the
/// probe but fails every balance query is never marked unavailable.
#[tokio::test]
async fn test_query_failures_do_not_affect_availability() {
    let mut flaky = RpcMockBuilder::new().await;
    flaky.mock_block_number(1).await;
    flaky.mock_rpc_error("eth_getBalance", -32000, "missing trie node").await;

    let metrics = RecordingMetrics::new();
    let registry = build_registry(&[("flaky", flaky.url())], metrics.clone());
    let monitor = HealthMonitor::new(registry.clone(), metrics.clone());
    let engine = ProxyEngine::new(registry.clone(), metrics.clone());

    monitor.check_all().wait().await;
    for _ in 0..3 {
        let result = engine
            .get_balance(&test_address(), &BlockSelector::default(), Duration::from_secs(5))
            .await;
        assert_eq!(result, Err(BalanceError::AllEndpointsFailed { attempted: 1 }));
    }
    monitor.check_all().wait().await;

    assert_eq!(registry.is_available("flaky"), Some(true));
    assert_eq!(metrics.failures_for("flaky"), [FailureReason::RpcError; 3]);
}
