//! Mock Infrastructure for Testing the Balance Proxy
//!
//! This module provides reusable mock upstreams for testing without real network
//! connections.
//!
//! ## Components
//!
//! - `RpcMockBuilder`: Wraps mockito to provide Ethereum-specific RPC mocking
//! - `StalledUpstream`: Accepts connections and never answers, for deadline tests
//! - `DelayedUpstream`: Answers after a fixed delay, for ordering tests
//! - `RecordingMetrics`: A metrics sink that keeps every signal
//!
//! ## Usage
//!
//! ```ignore
//! use tests::mock_infrastructure::RpcMockBuilder;
//!
//! let mut mock = RpcMockBuilder::new().await;
//! mock.mock_balance(1_000_000_000_000_000_000).await;
//!
//! // Use mock.url() as the endpoint URL
//! ```

pub mod rpc_mock;

pub use rpc_mock::RpcMockBuilder;
pub use test_helpers::*;
