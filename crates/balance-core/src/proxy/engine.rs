use alloy_primitives::U256;
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    metrics::MetricsSink,
    upstream::{
        consensus::{self, ConsensusResult},
        errors::BalanceError,
        fanout::FanoutEngine,
        registry::EndpointRegistry,
    },
    utils::{Address, BlockSelector},
};

/// Composed entry point for the request boundary: fan-out, then consensus.
pub struct ProxyEngine {
    fanout: FanoutEngine,
    metrics: Arc<dyn MetricsSink>,
}

impl ProxyEngine {
    #[must_use]
    pub fn new(registry: Arc<EndpointRegistry>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self { fanout: FanoutEngine::new(registry, Arc::clone(&metrics)), metrics }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        self.fanout.registry()
    }

    /// Used by the readiness probe.
    #[must_use]
    pub fn has_available_endpoints(&self) -> bool {
        self.registry().has_available()
    }

    /// Returns the consensus balance of `address` at `block`.
    ///
    /// # Errors
    ///
    /// Returns [`BalanceError::NoEndpointsAvailable`] or [`BalanceError::AllEndpointsFailed`].
    pub async fn get_balance(
        &self,
        address: &Address,
        block: &BlockSelector,
        timeout: Duration,
    ) -> Result<U256, BalanceError> {
        self.get_balance_detailed(address, block, timeout).await.map(|result| result.value)
    }

    /// Like [`Self::get_balance`] but returns the full vote.
    ///
    /// When `timeout` elapses, outstanding calls are cancelled and the engine waits only for
    /// their cancellation acknowledgements.
    ///
    /// # Errors
    ///
    /// Returns [`BalanceError::NoEndpointsAvailable`] or [`BalanceError::AllEndpointsFailed`].
    pub async fn get_balance_detailed(
        &self,
        address: &Address,
        block: &BlockSelector,
        timeout: Duration,
    ) -> Result<ConsensusResult, BalanceError> {
        let cancel = CancellationToken::new();
        let query = self.fanout.query_all(address, block, cancel.clone());
        tokio::pin!(query);

        let replies = tokio::select! {
            result = &mut query => result,
            () = tokio::time::sleep(timeout) => {
                debug!(
                    address = %address,
                    timeout_ms = timeout.as_millis(),
                    "request deadline expired"
                );
                cancel.cancel();
                query.await
            }
        }?;

        let attempted = replies.len();
        let result = consensus::resolve(&replies)
            .ok_or(BalanceError::AllEndpointsFailed { attempted })?;

        if result.disagreement {
            let distinct: Vec<String> =
                result.groups.iter().map(|group| group.value.to_string()).collect();
            warn!(
                address = %address,
                winner = %result.value,
                votes = result.agreement_count,
                replies = result.total_replies,
                distinct_values = ?distinct,
                "balance discrepancy between endpoints"
            );
            self.metrics.record_disagreement(address.as_str());
        }

        Ok(result)
    }
}
