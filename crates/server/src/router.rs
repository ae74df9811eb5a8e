use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use balance_core::{
    upstream::errors::BalanceError,
    utils::{Address, BlockSelector},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub block: Option<String>,
}

fn error_response(error: &BalanceError) -> (StatusCode, Json<serde_json::Value>) {
    let status = if error.is_unavailable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(json!({ "error": error.to_string() })))
}

/// `GET /eth/balance/{address}?block=<selector>`
///
/// Responds with the consensus balance as a decimal string.
pub async fn handle_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<BalanceQuery>,
) -> impl IntoResponse {
    let parsed = Address::parse(&address).and_then(|address| {
        BlockSelector::parse(query.block.as_deref()).map(|block| (address, block))
    });
    let (address, block) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(error = %e, "rejected balance request");
            return error_response(&BalanceError::from(e));
        }
    };

    match state.proxy_engine.get_balance(&address, &block, state.request_timeout).await {
        Ok(balance) => (StatusCode::OK, Json(json!({ "balance": balance.to_string() }))),
        Err(e) => {
            warn!(address = %address, block = %block, error = %e, "balance request failed");
            error_response(&e)
        }
    }
}

pub async fn handle_live() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "alive" })))
}

pub async fn handle_ready(State(state): State<AppState>) -> impl IntoResponse {
    if state.proxy_engine.has_available_endpoints() {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not ready", "message": "no clients available" })),
        )
    }
}

pub async fn handle_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state.metrics.as_ref().map(|metrics| metrics.render()).unwrap_or_default();

    (StatusCode::OK, [("content-type", "text/plain; version=0.0.4; charset=utf-8")], body)
}
