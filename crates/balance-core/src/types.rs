//! JSON-RPC wire types and endpoint configuration.
//!
//! - [`JsonRpcRequest`], [`JsonRpcResponse`], [`JsonRpcError`]: The envelope exchanged with
//!   upstream endpoints
//! - [`EndpointConfig`]: Static per-endpoint settings produced by the configuration loader

use serde::{Deserialize, Serialize};
use std::{borrow::Cow, sync::Arc, time::Duration};

/// JSON-RPC protocol version constant.
pub const JSONRPC_VERSION: &str = "2.0";

/// Method used to query an account balance at a block.
pub const METHOD_GET_BALANCE: &str = "eth_getBalance";

/// Method used as the liveness probe.
pub const METHOD_BLOCK_NUMBER: &str = "eth_blockNumber";

/// Call identifier used for every outbound request. Each request travels on its own HTTP
/// exchange, so the identifier never needs to be unique.
const REQUEST_ID: u64 = 1;

/// JSON-RPC 2.0 request structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: Cow<'static, str>,
    pub method: Cow<'static, str>,
    pub params: Vec<serde_json::Value>,
    pub id: u64,
}

impl JsonRpcRequest {
    #[must_use]
    pub fn new(method: &'static str, params: Vec<serde_json::Value>) -> Self {
        Self {
            jsonrpc: Cow::Borrowed(JSONRPC_VERSION),
            method: Cow::Borrowed(method),
            params,
            id: REQUEST_ID,
        }
    }

    /// Builds an `eth_getBalance` request with positional `[address, block]` params.
    #[must_use]
    pub fn get_balance(address: &str, block: &str) -> Self {
        Self::new(
            METHOD_GET_BALANCE,
            vec![
                serde_json::Value::String(address.to_string()),
                serde_json::Value::String(block.to_string()),
            ],
        )
    }

    /// Builds an `eth_blockNumber` request with no params.
    #[must_use]
    pub fn block_number() -> Self {
        Self::new(METHOD_BLOCK_NUMBER, Vec::new())
    }
}

/// JSON-RPC 2.0 response structure.
///
/// A well-formed response carries either a `result` or an `error`. Upstreams do not always
/// honour that, so both are optional and the caller decides what a missing result means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// Structured error object carried by an unsuccessful JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Static configuration for one upstream endpoint.
///
/// Built once at startup by [`crate::config::AppConfig::to_endpoint_configs`] and never
/// changed afterwards.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub name: Arc<str>,
    pub url: String,
    pub timeout: Duration,
}

impl EndpointConfig {
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, url: impl Into<String>, timeout: Duration) -> Self {
        Self { name: name.into(), url: url.into(), timeout }
    }
}
