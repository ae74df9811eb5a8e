//! Input validation and hex decoding helpers.
//!
//! ## Addresses (`address`)
//! - Accepts 40 hex digits with an optional `0x` prefix
//! - Normalises to the lowercase `0x`-prefixed form sent upstream
//!
//! ## Block Selectors (`block_param`)
//! - `latest`, `earliest`, `pending`, `safe`, `finalized` tags
//! - Decimal or hex block numbers, normalised to hex quantities
//!
//! ## Quantities (`hex`)
//! - Strict decoding of hex-encoded unsigned quantities into 256-bit integers

pub mod address;
pub mod block_param;
pub mod hex;

pub use address::Address;
pub use block_param::{BlockSelector, BlockTag};

use thiserror::Error;

/// Rejected caller input. Never reaches the fan-out engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("invalid Ethereum address: {0}")]
    InvalidAddress(String),
    #[error("invalid block parameter: {0}")]
    InvalidBlock(String),
}
