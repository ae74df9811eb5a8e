//! Plurality vote over balance replies.
//!
//! All functions are stateless and operate on the reply slice they are given.

use alloy_primitives::U256;
use std::collections::HashMap;

use super::types::{BalanceReply, ConsensusResult, ValueGroup};

/// Groups replies by exact value, in order of first occurrence.
#[must_use]
pub fn group_replies(replies: &[BalanceReply]) -> Vec<ValueGroup> {
    let mut groups: Vec<ValueGroup> = Vec::new();
    let mut positions: HashMap<&U256, usize> = HashMap::with_capacity(replies.len());

    for (index, reply) in replies.iter().enumerate() {
        if let Some(&position) = positions.get(&reply.value) {
            let group = &mut groups[position];
            group.count += 1;
            group.endpoints.push(reply.endpoint.clone());
        } else {
            positions.insert(&reply.value, groups.len());
            groups.push(ValueGroup {
                value: reply.value,
                count: 1,
                first_index: index,
                endpoints: vec![reply.endpoint.clone()],
            });
        }
    }

    groups
}

/// Resolves a set of replies to one value.
///
/// Returns `None` only for an empty slice, which callers must never pass.
#[must_use]
pub fn resolve(replies: &[BalanceReply]) -> Option<ConsensusResult> {
    let groups = group_replies(replies);

    // Groups are in first-occurrence order, so keeping the first strictly larger count
    // implements the tie-break.
    let mut winner: Option<&ValueGroup> = None;
    for group in &groups {
        if winner.map_or(true, |best| group.count > best.count) {
            winner = Some(group);
        }
    }
    let winner = winner?;

    Some(ConsensusResult {
        value: winner.value,
        disagreement: groups.len() > 1,
        agreement_count: winner.count,
        total_replies: replies.len(),
        groups,
    })
}
