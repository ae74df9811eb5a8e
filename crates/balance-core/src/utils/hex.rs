//! Strict decoding of JSON-RPC hex quantities.

use alloy_primitives::U256;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuantityError {
    #[error("empty hex string")]
    Empty,
    #[error("hex string without 0x prefix")]
    MissingPrefix,
    #[error("hex number with leading zero digits")]
    LeadingZero,
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    #[error("hex number exceeds 256 bits: {0}")]
    Overflow(String),
}

/// Decodes a `0x`-prefixed hex quantity into a 256-bit unsigned integer.
///
/// Quantities follow the JSON-RPC encoding rules: the prefix is mandatory, at least one digit
/// is required, and leading zeros are only allowed for zero itself (`0x0`).
///
/// # Examples
/// ```
/// use balance_core::utils::hex::decode_quantity;
/// use alloy_primitives::U256;
///
/// assert_eq!(decode_quantity("0x0").unwrap(), U256::from(0u32));
/// let two_ether = U256::from(2_000_000_000_000_000_000u64);
/// assert_eq!(decode_quantity("0x1bc16d674ec80000").unwrap(), two_ether);
/// assert!(decode_quantity("0x01").is_err());
/// ```
///
/// # Errors
/// Returns a [`QuantityError`] describing the first rule the input violates.
pub fn decode_quantity(input: &str) -> Result<U256, QuantityError> {
    if input.is_empty() {
        return Err(QuantityError::Empty);
    }
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .ok_or(QuantityError::MissingPrefix)?;
    if digits.is_empty() {
        return Err(QuantityError::Empty);
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(QuantityError::InvalidHex(input.to_string()));
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(QuantityError::LeadingZero);
    }

    U256::from_str_radix(digits, 16).map_err(|_| QuantityError::Overflow(input.to_string()))
}
