//! # Balance Core
//!
//! Core library for a read-side Ethereum balance proxy: one balance query is fanned out to
//! every available upstream JSON-RPC endpoint and the replies are resolved to a single value
//! by plurality vote.
//!
//! - **[`upstream`]**: Endpoint registry, health monitor, fan-out engine and consensus
//!   resolver.
//!
//! - **[`proxy`]**: [`proxy::ProxyEngine`], the composed entry point used by the HTTP boundary.
//!
//! - **[`config`]**: Layered configuration (defaults, TOML file, environment).
//!
//! - **[`metrics`]**: The observability sink the core reports through, with a Prometheus
//!   implementation.
//!
//! - **[`utils`]**: Address and block selector validation, hex quantity decoding.
//!
//! ## Architecture
//!
//! ```text
//! ProxyEngine
//!   ├── FanoutEngine ──▶ consensus::resolve
//!   │        │ list_available
//!   │        ▼
//!   ├── EndpointRegistry ◀── set_availability ── HealthMonitor
//!   │
//!   └── MetricsSink ◀── failures, availability gauges, discrepancies
//! ```
//!
//! ## Request Flow
//!
//! ```text
//! GET /eth/balance/{address}
//!       │
//!       ▼
//! ┌─────────────┐
//! │  Validation │ ─── Invalid ──► 400
//! └──────┬──────┘
//!        │ Valid
//!        ▼
//! ┌─────────────┐
//! │ ProxyEngine │ ─── deadline armed (cancellation token)
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │ FanoutEngine │ ─── nothing available / all failed ──► 503
//! └──────┬───────┘
//!        │ successful replies, snapshot order
//!        ▼
//! ┌──────────────┐
//! │  Plurality   │ ─── disagreement ──► warn + discrepancy counter
//! └──────┬───────┘
//!        ▼
//!   {"balance": "<decimal>"}
//! ```

pub mod config;
pub mod metrics;
pub mod proxy;
pub mod types;
pub mod upstream;
pub mod utils;
