//! RPC Mock Builder for Ethereum JSON-RPC Testing
//!
//! Wraps mockito to provide canned replies for the two methods the proxy sends:
//! `eth_getBalance` and `eth_blockNumber`.

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};

fn method_matcher(method: &str) -> Matcher {
    Matcher::Regex(format!(r#""method"\s*:\s*"{method}""#))
}

/// Builder for creating mock Ethereum RPC responses.
///
/// Uses mockito internally but provides Ethereum-specific helpers.
pub struct RpcMockBuilder {
    server: ServerGuard,
    mocks: Vec<Mock>,
}

impl RpcMockBuilder {
    /// Creates a new RPC mock builder with a fresh mockito server.
    pub async fn new() -> Self {
        Self { server: Server::new_async().await, mocks: Vec::new() }
    }

    /// Returns the URL of the mock server.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.url()
    }

    async fn mock_reply(&mut self, method: &str, status: usize, body: String) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .match_body(method_matcher(method))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        self.mocks.push(mock);
        self
    }

    /// Mocks `eth_getBalance` with a balance in wei.
    pub async fn mock_balance(&mut self, wei: u128) -> &mut Self {
        self.mock_balance_hex(&format!("0x{wei:x}")).await
    }

    /// Mocks `eth_getBalance` with a raw `result` string.
    pub async fn mock_balance_hex(&mut self, result: &str) -> &mut Self {
        let body = json!({"jsonrpc": "2.0", "id": 1, "result": result}).to_string();
        self.mock_reply("eth_getBalance", 200, body).await
    }

    /// Mocks `eth_getBalance` for one address and block only.
    pub async fn mock_balance_at(&mut self, address: &str, block: &str, wei: u128) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "eth_getBalance",
                "params": [address, block]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"jsonrpc": "2.0", "id": 1, "result": format!("0x{wei:x}")}).to_string(),
            )
            .create_async()
            .await;

        self.mocks.push(mock);
        self
    }

    /// Mocks an `eth_blockNumber` request.
    pub async fn mock_block_number(&mut self, block_number: u64) -> &mut Self {
        let body =
            json!({"jsonrpc": "2.0", "id": 1, "result": format!("0x{block_number:x}")}).to_string();
        self.mock_reply("eth_blockNumber", 200, body).await
    }

    /// Mocks a JSON-RPC error envelope for `method`.
    pub async fn mock_rpc_error(&mut self, method: &str, code: i64, message: &str) -> &mut Self {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": code, "message": message}
        })
        .to_string();
        self.mock_reply(method, 200, body).await
    }

    /// Mocks an HTTP error status for `method`.
    pub async fn mock_http_status(&mut self, method: &str, status: usize) -> &mut Self {
        self.mock_reply(method, status, r#"{"error":"upstream unavailable"}"#.to_string()).await
    }

    /// Mocks a successful status with an arbitrary body for `method`.
    pub async fn mock_raw_body(&mut self, method: &str, body: &Value) -> &mut Self {
        self.mock_reply(method, 200, body.to_string()).await
    }

    /// Mocks a body that is not JSON at all.
    pub async fn mock_malformed(&mut self, method: &str) -> &mut Self {
        self.mock_reply(method, 200, "<html>bad gateway</html>".to_string()).await
    }

    /// Registers a catch-all mock that must never be hit.
    pub async fn expect_no_requests(&mut self) -> &mut Self {
        let mock = self.server.mock("POST", Matcher::Any).expect(0).create_async().await;
        self.mocks.push(mock);
        self
    }

    /// Asserts every registered mock saw its expected number of hits.
    pub async fn assert_all(&self) {
        for mock in &self.mocks {
            mock.assert_async().await;
        }
    }
}
