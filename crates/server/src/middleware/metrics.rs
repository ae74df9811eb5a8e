use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use balance_core::metrics::MetricsCollector;
use std::{sync::Arc, time::Instant};

/// Records request count and latency per method, route template and status.
///
/// The route template (`/eth/balance/{address}`) is used rather than the raw path so that
/// label cardinality stays bounded.
pub async fn http_metrics_middleware(
    State(metrics): State<Arc<MetricsCollector>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |path| path.as_str().to_string());

    let response = next.run(request).await;

    metrics.record_http_request(&method, &endpoint, response.status().as_u16(), start.elapsed());
    response
}
