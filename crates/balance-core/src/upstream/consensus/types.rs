//! Consensus input and result types.

use alloy_primitives::U256;
use std::sync::Arc;

/// A successful balance reply from one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceReply {
    pub endpoint: Arc<str>,
    pub value: U256,
}

impl BalanceReply {
    #[must_use]
    pub fn new(endpoint: impl Into<Arc<str>>, value: U256) -> Self {
        Self { endpoint: endpoint.into(), value }
    }
}

/// Replies that carried the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueGroup {
    pub value: U256,
    pub count: usize,
    /// Position of the first reply carrying this value.
    pub first_index: usize,
    pub endpoints: Vec<Arc<str>>,
}

/// Outcome of a plurality vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsensusResult {
    pub value: U256,
    /// More than one distinct value was observed.
    pub disagreement: bool,
    /// Number of replies that voted for `value`.
    pub agreement_count: usize,
    pub total_replies: usize,
    /// All groups, in first-occurrence order.
    pub groups: Vec<ValueGroup>,
}

impl ConsensusResult {
    #[must_use]
    pub fn distinct_values(&self) -> usize {
        self.groups.len()
    }
}
