use crate::utils::InputError;
use thiserror::Error;

/// Errors from a single call against one upstream endpoint.
///
/// These never escape the fan-out: the engine logs them, counts them by
/// [`FailureReason`], and drops the reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UpstreamError {
    /// Network-level failure (connect, reset, body read). The message is sanitized.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The per-call timeout elapsed before the endpoint answered.
    #[error("Request timeout")]
    Timeout,

    /// Non-2xx HTTP status.
    ///
    /// First field is the status code, second is the (truncated) response body.
    #[error("HTTP error: {0}")]
    HttpStatus(u16, String),

    /// Body was not a well-formed JSON-RPC envelope.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The envelope carried an `error` object instead of a result.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The envelope was fine but the result could not be decoded as a quantity.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The caller's deadline expired and the call was abandoned.
    #[error("Request cancelled")]
    Cancelled,

    /// The task running the call failed (panic or runtime shutdown).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl UpstreamError {
    /// Network-level failures, including timeouts and abandoned calls.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout | Self::Cancelled)
    }

    /// The endpoint answered, but not with a usable balance.
    #[must_use]
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Self::HttpStatus(..) | Self::InvalidResponse(_) | Self::Rpc { .. } | Self::Decode(_)
        )
    }

    #[must_use]
    pub fn failure_reason(&self) -> FailureReason {
        match self {
            Self::Transport(_) => FailureReason::RequestFailed,
            Self::Timeout => FailureReason::Timeout,
            Self::HttpStatus(..) => FailureReason::Non200Status,
            Self::InvalidResponse(_) => FailureReason::ParseError,
            Self::Rpc { .. } => FailureReason::RpcError,
            Self::Decode(_) => FailureReason::DecodeError,
            Self::Cancelled => FailureReason::DeadlineExceeded,
            Self::Internal(_) => FailureReason::Internal,
        }
    }
}

/// Label attached to the per-endpoint failure counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    RequestFailed,
    Timeout,
    Non200Status,
    ParseError,
    RpcError,
    DecodeError,
    DeadlineExceeded,
    Internal,
    /// A liveness probe could not reach the endpoint.
    HealthCheck,
}

impl FailureReason {
    /// Returns a static string representation for metrics labels.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequestFailed => "request_failed",
            Self::Timeout => "timeout",
            Self::Non200Status => "non_200_status",
            Self::ParseError => "parse_error",
            Self::RpcError => "rpc_error",
            Self::DecodeError => "decode_error",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::Internal => "internal",
            Self::HealthCheck => "health_check",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate outcome of a balance request, the only errors that reach callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BalanceError {
    #[error(transparent)]
    InvalidInput(#[from] InputError),

    /// The registry reported no available endpoint when the query was dispatched.
    #[error("no clients available")]
    NoEndpointsAvailable,

    /// Every dispatched call failed or was cancelled.
    #[error("all {attempted} clients failed")]
    AllEndpointsFailed { attempted: usize },
}

impl BalanceError {
    /// `true` for the outcomes a boundary should report as service unavailable.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::NoEndpointsAvailable | Self::AllEndpointsFailed { .. })
    }
}
