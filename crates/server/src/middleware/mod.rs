//! HTTP middleware components for the balance server.

pub mod metrics;

pub use metrics::http_metrics_middleware;
