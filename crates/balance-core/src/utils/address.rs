use super::InputError;
use std::fmt;

const ADDRESS_HEX_LEN: usize = 40;

/// A validated account address in lowercase `0x`-prefixed form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Parses and normalises an account address.
    ///
    /// # Examples
    /// ```
    /// use balance_core::utils::Address;
    ///
    /// let address = Address::parse("0xDe0B295669a9FD93d5F28D9Ec85E40f4cb697BAe").unwrap();
    /// assert_eq!(address.as_str(), "0xde0b295669a9fd93d5f28d9ec85e40f4cb697bae");
    /// ```
    ///
    /// # Errors
    /// Returns [`InputError::InvalidAddress`] unless the input is exactly 40 hex digits,
    /// optionally prefixed with `0x` or `0X`.
    pub fn parse(input: &str) -> Result<Self, InputError> {
        let digits = input
            .strip_prefix("0x")
            .or_else(|| input.strip_prefix("0X"))
            .unwrap_or(input);

        if digits.len() != ADDRESS_HEX_LEN || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InputError::InvalidAddress(input.to_string()));
        }

        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
