use alloy_primitives::U256;
use futures::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    metrics::MetricsSink,
    utils::{Address, BlockSelector},
};

use super::{
    consensus::BalanceReply,
    endpoint::UpstreamEndpoint,
    errors::{BalanceError, UpstreamError},
    registry::EndpointRegistry,
};

/// Outcome of one dispatched call: exactly one of value or failure.
#[derive(Debug, Clone)]
pub struct QueryReply {
    pub endpoint: Arc<str>,
    pub outcome: Result<U256, UpstreamError>,
}

/// Sends one balance query to every available endpoint and collects the successes.
///
/// The available set is snapshotted once per call. Every call in the snapshot runs on its own
/// task and is joined before returning, so replies come back in snapshot order no matter
/// which endpoint answered first.
pub struct FanoutEngine {
    registry: Arc<EndpointRegistry>,
    metrics: Arc<dyn MetricsSink>,
}

impl FanoutEngine {
    #[must_use]
    pub fn new(registry: Arc<EndpointRegistry>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self { registry, metrics }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        &self.registry
    }

    /// Queries every available endpoint and returns the successful replies in snapshot order.
    ///
    /// Calls still running when `cancel` fires are abandoned and count as failures. Dropping
    /// the returned future also cancels them.
    ///
    /// # Errors
    ///
    /// - [`BalanceError::NoEndpointsAvailable`] if the snapshot is empty; nothing is sent
    /// - [`BalanceError::AllEndpointsFailed`] if no call succeeded
    pub async fn query_all(
        &self,
        address: &Address,
        block: &BlockSelector,
        cancel: CancellationToken,
    ) -> Result<Vec<BalanceReply>, BalanceError> {
        let snapshot = self.registry.list_available();
        if snapshot.is_empty() {
            return Err(BalanceError::NoEndpointsAvailable);
        }

        let attempted = snapshot.len();
        let replies = self.dispatch(snapshot, address, block, cancel).await;

        let mut successes = Vec::with_capacity(attempted);
        for reply in replies {
            match reply.outcome {
                Ok(value) => successes.push(BalanceReply { endpoint: reply.endpoint, value }),
                Err(e) => {
                    let reason = e.failure_reason();
                    warn!(
                        endpoint = %reply.endpoint,
                        address = %address,
                        reason = %reason,
                        error = %e,
                        "balance query failed"
                    );
                    self.metrics.record_failure(&reply.endpoint, reason);
                }
            }
        }

        if successes.is_empty() {
            return Err(BalanceError::AllEndpointsFailed { attempted });
        }

        debug!(address = %address, attempted, succeeded = successes.len(), "fan-out complete");
        Ok(successes)
    }

    async fn dispatch(
        &self,
        snapshot: Vec<Arc<UpstreamEndpoint>>,
        address: &Address,
        block: &BlockSelector,
        cancel: CancellationToken,
    ) -> Vec<QueryReply> {
        // Outstanding calls are cancelled if this future is dropped before the join completes.
        let scope = cancel.child_token();
        let _guard = scope.clone().drop_guard();

        let names: Vec<Arc<str>> =
            snapshot.iter().map(|endpoint| Arc::clone(&endpoint.config().name)).collect();

        let handles: Vec<_> = snapshot
            .into_iter()
            .map(|endpoint| {
                let token = scope.child_token();
                let address = address.clone();
                let block = *block;
                tokio::spawn(async move {
                    tokio::select! {
                        biased;
                        () = token.cancelled() => Err(UpstreamError::Cancelled),
                        result = endpoint.query_balance(&address, &block) => result,
                    }
                })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .zip(names)
            .map(|(joined, endpoint)| {
                let outcome =
                    joined.unwrap_or_else(|e| Err(UpstreamError::Internal(e.to_string())));
                QueryReply { endpoint, outcome }
            })
            .collect()
    }
}
