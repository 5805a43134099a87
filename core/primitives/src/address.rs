// leadfive/core/primitives/src/address.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 20-byte account address on BNB Smart Chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub fn new(data: [u8; 20]) -> Self {
        Self(data)
    }

    pub fn zero() -> Self {
        Address([0u8; 20])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parse a `0x`-prefixed (or bare) 40 character hex string
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        if digits.len() != 40 {
            return Err(AddressError::InvalidLength(digits.len()));
        }

        let bytes = hex::decode(digits).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        let mut data = [0u8; 20];
        data.copy_from_slice(&bytes);
        Ok(Self(data))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Invalid address length: expected 40 hex digits, got {0}")]
    InvalidLength(usize),

    #[error("Invalid address hex: {0}")]
    InvalidHex(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let addr = Address([0xab; 20]);
        let text = addr.to_hex();
        assert_eq!(text, format!("0x{}", "ab".repeat(20)));
        assert_eq!(text.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_parse_without_prefix() {
        let addr = Address::from_hex(&"01".repeat(20)).unwrap();
        assert_eq!(addr, Address([1; 20]));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(
            Address::from_hex("0x1234"),
            Err(AddressError::InvalidLength(4))
        );
        assert!(matches!(
            Address::from_hex(&format!("0x{}", "zz".repeat(20))),
            Err(AddressError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_zero_address() {
        assert!(Address::zero().is_zero());
        assert!(!Address([1; 20]).is_zero());
        assert_eq!(Address::default(), Address::zero());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let addr = Address([7; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "07".repeat(20)));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
