//! Block selector parsing for balance queries.
//!
//! Accepts the standard block tags and explicit block numbers. Numbers are normalised to the
//! `0x`-prefixed hex quantity form that upstream endpoints expect.

use super::InputError;
use std::fmt;

/// Standard Ethereum block tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    /// The most recent block in the canonical chain
    Latest,
    /// The earliest/genesis block
    Earliest,
    /// A block in the pending state
    Pending,
    /// The most recent safe head block
    Safe,
    /// The most recent finalized block
    Finalized,
}

impl BlockTag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Earliest => "earliest",
            Self::Pending => "pending",
            Self::Safe => "safe",
            Self::Finalized => "finalized",
        }
    }
}

/// Block at which a balance is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSelector {
    Tag(BlockTag),
    Number(u64),
}

impl Default for BlockSelector {
    fn default() -> Self {
        Self::Tag(BlockTag::Latest)
    }
}

impl BlockSelector {
    /// Parses an optional block parameter. Absent or empty input selects `latest`.
    ///
    /// # Examples
    /// ```
    /// use balance_core::utils::{BlockSelector, BlockTag};
    ///
    /// assert_eq!(BlockSelector::parse(None).unwrap(), BlockSelector::Tag(BlockTag::Latest));
    /// assert_eq!(BlockSelector::parse(Some("0x10")).unwrap(), BlockSelector::Number(16));
    /// assert_eq!(BlockSelector::parse(Some("100")).unwrap().to_string(), "0x64");
    /// ```
    ///
    /// # Errors
    /// Returns [`InputError::InvalidBlock`] for anything that is neither a tag nor a number.
    pub fn parse(param: Option<&str>) -> Result<Self, InputError> {
        let param = match param.map(str::trim) {
            None | Some("") => return Ok(Self::default()),
            Some(p) => p,
        };

        let tag = match param {
            "latest" => Some(BlockTag::Latest),
            "earliest" => Some(BlockTag::Earliest),
            "pending" => Some(BlockTag::Pending),
            "safe" => Some(BlockTag::Safe),
            "finalized" => Some(BlockTag::Finalized),
            _ => None,
        };
        if let Some(tag) = tag {
            return Ok(Self::Tag(tag));
        }

        let (digits, radix) = match param.strip_prefix("0x").or_else(|| param.strip_prefix("0X")) {
            Some(hex_digits) => (hex_digits, 16),
            None => (param, 10),
        };
        let invalid = || InputError::InvalidBlock(param.to_string());

        // `from_str_radix` tolerates a leading `+`, so digits are checked first.
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return Err(invalid());
        }
        u64::from_str_radix(digits, radix).map(Self::Number).map_err(|_| invalid())
    }
}

impl fmt::Display for BlockSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => f.write_str(tag.as_str()),
            Self::Number(n) => write!(f, "0x{n:x}"),
        }
    }
}
