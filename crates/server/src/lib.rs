//! HTTP boundary for the balance proxy.
//!
//! Thin adapter over [`balance_core::proxy::ProxyEngine`]: validates input, applies the
//! per-request deadline, and maps core outcomes to status codes.

pub mod middleware;
pub mod router;

use axum::{middleware as axum_middleware, routing::get, Router};
use balance_core::{metrics::MetricsCollector, proxy::ProxyEngine};
use std::{sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub proxy_engine: Arc<ProxyEngine>,
    /// `None` when metrics export is disabled.
    pub metrics: Option<Arc<MetricsCollector>>,
    pub request_timeout: Duration,
}

/// Builds the application router.
///
/// `/metrics` and the HTTP metrics middleware are only installed when `state.metrics` is set.
pub fn create_app(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/eth/balance/{address}", get(router::handle_balance))
        .route("/health/live", get(router::handle_live))
        .route("/health/ready", get(router::handle_ready));

    if let Some(metrics) = state.metrics.clone() {
        app = app
            .route("/metrics", get(router::handle_metrics))
            .layer(axum_middleware::from_fn_with_state(
                metrics,
                middleware::http_metrics_middleware,
            ));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}
