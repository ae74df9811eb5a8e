//! # Metrics
//!
//! The core never talks to a metrics registry directly. Components receive an
//! `Arc<dyn MetricsSink>` and report through three capabilities:
//!
//! - `record_failure`: per-endpoint failure counter keyed by [`FailureReason`]
//! - `set_availability_gauge`: per-endpoint availability (1 = available, 0 = unavailable)
//! - `record_disagreement`: counter of balance discrepancies per address
//!
//! [`MetricsCollector`] implements the sink on top of the `metrics` facade with a
//! process-global Prometheus recorder. [`NoopMetrics`] discards everything.
//!
//! ## String Interning
//!
//! Endpoint names are interned to avoid per-request allocations for label values. The set of
//! endpoints is fixed at startup, so the pool is bounded.

use crate::upstream::errors::FailureReason;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::{borrow::Cow, sync::OnceLock, time::Duration};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

static ENDPOINT_NAME_POOL: OnceLock<dashmap::DashMap<String, &'static str>> = OnceLock::new();

#[inline]
fn endpoint_to_static(endpoint: &str) -> Cow<'static, str> {
    let pool = ENDPOINT_NAME_POOL.get_or_init(dashmap::DashMap::new);

    if let Some(interned) = pool.get(endpoint) {
        return Cow::Borrowed(*interned);
    }

    let owned = endpoint.to_string();
    let leaked: &'static str = Box::leak(owned.clone().into_boxed_str());
    pool.insert(owned, leaked);
    Cow::Borrowed(leaked)
}

/// Observability capabilities the core reports through.
pub trait MetricsSink: Send + Sync {
    /// Counts one failed call against `endpoint`.
    fn record_failure(&self, endpoint: &str, reason: FailureReason);

    /// Publishes the current availability flag of `endpoint`.
    fn set_availability_gauge(&self, endpoint: &str, available: bool);

    /// Counts one query whose successful replies disagreed.
    fn record_disagreement(&self, address: &str);
}

/// Sink that drops every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record_failure(&self, _endpoint: &str, _reason: FailureReason) {}

    fn set_availability_gauge(&self, _endpoint: &str, _available: bool) {}

    fn record_disagreement(&self, _address: &str) {}
}

fn try_init_prometheus_recorder(
) -> Result<PrometheusHandle, metrics_exporter_prometheus::BuildError> {
    PrometheusBuilder::new().install_recorder()
}

fn init_prometheus_recorder() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| match try_init_prometheus_recorder() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "global metrics recorder already installed, using a detached Prometheus recorder"
                );
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

/// Prometheus-backed [`MetricsSink`].
///
/// Cheap to construct repeatedly: the global recorder is installed once per process and every
/// collector shares its handle.
#[derive(Clone)]
pub struct MetricsCollector {
    prometheus_handle: PrometheusHandle,
}

impl MetricsCollector {
    #[must_use]
    pub fn new() -> Self {
        Self { prometheus_handle: init_prometheus_recorder() }
    }

    /// Renders all recorded metrics in the Prometheus text exposition format.
    #[must_use]
    pub fn render(&self) -> String {
        self.prometheus_handle.render()
    }

    /// Records one served HTTP request at the boundary.
    pub fn record_http_request(
        &self,
        method: &str,
        endpoint: &str,
        status: u16,
        latency: Duration,
    ) {
        let method = method.to_string();
        let endpoint = endpoint.to_string();
        let status = status.to_string();

        counter!(
            "http_requests_total",
            "method" => method.clone(),
            "endpoint" => endpoint.clone(),
            "status" => status.clone()
        )
        .increment(1);
        histogram!(
            "request_duration_seconds",
            "method" => method,
            "endpoint" => endpoint,
            "status" => status
        )
        .record(latency.as_secs_f64());
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSink for MetricsCollector {
    fn record_failure(&self, endpoint: &str, reason: FailureReason) {
        let endpoint_cow = endpoint_to_static(endpoint);
        counter!(
            "client_errors_total",
            "client_name" => endpoint_cow,
            "error_type" => reason.as_str()
        )
        .increment(1);
    }

    fn set_availability_gauge(&self, endpoint: &str, available: bool) {
        let endpoint_cow = endpoint_to_static(endpoint);
        let value = if available { 1.0 } else { 0.0 };
        gauge!("client_availability", "client_name" => endpoint_cow).set(value);
    }

    fn record_disagreement(&self, address: &str) {
        counter!("balance_discrepancy_total", "address" => address.to_string()).increment(1);
    }
}
