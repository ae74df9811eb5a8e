use bytes::Bytes;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

use crate::upstream::UpstreamError;

const USER_AGENT: &str = concat!("balance-proxy/", env!("CARGO_PKG_VERSION"));

/// Maximum number of bytes of an error body kept in [`UpstreamError::HttpStatus`].
const MAX_ERROR_BODY: usize = 256;

/// Connection pool settings for the shared upstream client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            pool_idle_timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 32,
        }
    }
}

/// Pooled HTTP client shared by every upstream endpoint.
///
/// Timeouts are applied per request so the balance query and the liveness probe can use
/// different budgets over the same pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn new() -> Result<Self, UpstreamError> {
        Self::with_config(&HttpClientConfig::default())
    }

    /// Creates a new HTTP client with the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn with_config(config: &HttpClientConfig) -> Result<Self, UpstreamError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .connect_timeout(config.connect_timeout)
            .use_rustls_tls()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(USER_AGENT)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build http client");
                UpstreamError::Internal(format!("HTTP client build failed: {e}"))
            })?;

        Ok(Self { client })
    }

    /// Sanitizes network errors to prevent information disclosure.
    fn sanitize_network_error(error: &reqwest::Error) -> String {
        if error.is_connect() {
            "connection refused or unreachable".to_string()
        } else if error.is_timeout() {
            "connection timed out".to_string()
        } else if error.is_request() {
            "request failed".to_string()
        } else if error.is_body() {
            "response body error".to_string()
        } else if error.is_decode() {
            "response decode error".to_string()
        } else {
            "network error".to_string()
        }
    }

    fn map_send_error(error: &reqwest::Error) -> UpstreamError {
        if error.is_timeout() {
            UpstreamError::Timeout
        } else {
            UpstreamError::Transport(Self::sanitize_network_error(error))
        }
    }

    /// POSTs a JSON body and returns the raw response body of a successful reply.
    ///
    /// # Errors
    ///
    /// - [`UpstreamError::Timeout`] if `timeout` elapses first
    /// - [`UpstreamError::HttpStatus`] for non-success HTTP status codes
    /// - [`UpstreamError::Transport`] for other network failures
    pub async fn post_json(
        &self,
        url: &str,
        body: Bytes,
        timeout: Duration,
    ) -> Result<Bytes, UpstreamError> {
        let response = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .body(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Self::map_send_error(&e))?;

        let status = response.status();
        if status.is_success() {
            return response.bytes().await.map_err(|e| Self::map_send_error(&e));
        }

        let raw_text = response.text().await.unwrap_or_default();
        tracing::trace!(status = status.as_u16(), "upstream returned error status");
        Err(UpstreamError::HttpStatus(status.as_u16(), truncate_body(raw_text)))
    }
}

fn truncate_body(mut text: String) -> String {
    if text.len() <= MAX_ERROR_BODY {
        return text;
    }
    let mut cut = MAX_ERROR_BODY;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    text.push_str("... (truncated)");
    text
}
