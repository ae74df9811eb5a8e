use alloy_primitives::U256;
use bytes::Bytes;
use std::{sync::Arc, time::Duration};

use crate::{
    types::{EndpointConfig, JsonRpcRequest, JsonRpcResponse},
    upstream::http_client::HttpClient,
    utils::{hex::decode_quantity, Address, BlockSelector},
};

use super::errors::UpstreamError;

/// One remote JSON-RPC service.
///
/// Knows how to perform a single balance query and a single liveness probe. Holds no mutable
/// state: availability lives in the [`super::registry::EndpointRegistry`].
#[derive(Debug)]
pub struct UpstreamEndpoint {
    config: EndpointConfig,
    http_client: Arc<HttpClient>,
}

impl UpstreamEndpoint {
    #[must_use]
    pub fn new(config: EndpointConfig, http_client: Arc<HttpClient>) -> Self {
        Self { config, http_client }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns a reference to the endpoint configuration.
    #[must_use]
    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    async fn post(
        &self,
        request: &JsonRpcRequest,
        timeout: Duration,
    ) -> Result<Bytes, UpstreamError> {
        let body = serde_json::to_vec(request)
            .map_err(|e| UpstreamError::Internal(format!("Failed to serialize request: {e}")))?;
        self.http_client.post_json(&self.config.url, Bytes::from(body), timeout).await
    }

    /// Queries the balance of `address` at `block`, bounded by the endpoint's own timeout.
    ///
    /// # Errors
    ///
    /// - transport and status failures from [`HttpClient::post_json`]
    /// - [`UpstreamError::InvalidResponse`] if the body is not a JSON-RPC envelope
    /// - [`UpstreamError::Rpc`] if the envelope carries an error object
    /// - [`UpstreamError::Decode`] if the result is missing or not a hex quantity
    pub async fn query_balance(
        &self,
        address: &Address,
        block: &BlockSelector,
    ) -> Result<U256, UpstreamError> {
        let request = JsonRpcRequest::get_balance(address.as_str(), &block.to_string());
        let response_bytes = self.post(&request, self.config.timeout).await?;

        let response: JsonRpcResponse = serde_json::from_slice(&response_bytes)
            .map_err(|e| UpstreamError::InvalidResponse(format!("Invalid JSON: {e}")))?;

        if let Some(error) = response.error {
            return Err(UpstreamError::Rpc { code: error.code, message: error.message });
        }

        let hex = response
            .result
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| UpstreamError::Decode("result is missing or not a string".to_string()))?;

        decode_quantity(hex).map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    /// Sends an `eth_blockNumber` liveness probe.
    ///
    /// Succeeds only if the body is a JSON object with no `error` key at all. A present but
    /// `null` error still fails the probe.
    ///
    /// # Errors
    ///
    /// Returns the first reason the probe is considered unhealthy.
    pub async fn probe(&self, timeout: Duration) -> Result<(), UpstreamError> {
        let response_bytes = self.post(&JsonRpcRequest::block_number(), timeout).await?;

        let body: serde_json::Value = serde_json::from_slice(&response_bytes)
            .map_err(|e| UpstreamError::InvalidResponse(format!("Invalid JSON: {e}")))?;
        let envelope = body
            .as_object()
            .ok_or_else(|| UpstreamError::InvalidResponse("reply is not a JSON object".into()))?;

        match envelope.get("error") {
            None => Ok(()),
            Some(error) => {
                let code =
                    error.get("code").and_then(serde_json::Value::as_i64).unwrap_or_default();
                let message = error
                    .get("message")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("error field present")
                    .to_string();
                Err(UpstreamError::Rpc { code, message })
            }
        }
    }
}
