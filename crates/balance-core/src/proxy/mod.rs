//! Request-level composition of the upstream components.
//!
//! [`ProxyEngine`] is the only type the HTTP boundary talks to: it arms the per-request
//! deadline, runs the fan-out and resolves the replies.

pub mod engine;

pub use engine::ProxyEngine;
