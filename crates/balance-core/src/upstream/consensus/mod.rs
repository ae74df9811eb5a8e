//! # Consensus Resolver
//!
//! Picks one balance out of the successful replies of a fan-out.
//!
//! ## Algorithm
//!
//! 1. **Grouping**: Replies are grouped by exact `U256` equality. Groups are kept in the
//!    order their value first appeared in the reply sequence.
//! 2. **Plurality**: The group with the strictly largest count wins. No threshold is applied,
//!    so a value can win with fewer than half the votes.
//! 3. **Tie-break**: Among equal counts, the value seen first wins.
//! 4. **Disagreement**: Flagged whenever more than one distinct value was observed.
//!
//! The fan-out engine hands replies over in dispatch (configuration) order, which makes the
//! tie-break reproducible regardless of which endpoint answered first.

pub mod quorum;
pub mod types;

pub use quorum::{group_replies, resolve};
pub use types::{BalanceReply, ConsensusResult, ValueGroup};
