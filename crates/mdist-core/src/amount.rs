//! # Amounts — 256-bit Claim Values
//!
//! A claim amount is an unsigned big integer, committed to the tree as a
//! 32-byte big-endian word. `Amount` wraps `primitive_types::U256` so any
//! value that can be hashed can also be represented exactly.
//!
//! Amounts travel as minimal `0x`-prefixed lowercase hex (`0x64` for 100).
//! On input, a `0x` prefix selects hex and anything else is read as decimal.
//!
//! `TokenTotal` is the sum of all amounts in a distribution. It is metadata
//! only (never hashed) and is held in a `U512` so a sum of `U256` values
//! cannot overflow.

use std::fmt;

use primitive_types::{U256, U512};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Why an amount string was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    /// No digits were supplied.
    #[error("empty amount")]
    Empty,

    /// A character outside the radix was found.
    #[error("invalid digit in amount")]
    InvalidDigit,

    /// The value does not fit in 256 bits.
    #[error("amount exceeds 256 bits")]
    Overflow,
}

/// A claim amount.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(U256);

impl Amount {
    /// Wrap a raw `U256`.
    pub fn new(value: U256) -> Self {
        Self(value)
    }

    /// Access the inner value.
    pub fn value(&self) -> U256 {
        self.0
    }

    /// True for a zero amount, which no claim may carry.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parse a `0x`-prefixed hex string or a decimal string.
    pub fn parse(input: &str) -> Result<Self, AmountParseError> {
        let trimmed = input.trim();
        if let Some(digits) = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            return parse_hex(digits).map(Self);
        }
        parse_decimal(trimmed).map(Self)
    }

    /// The amount as a 32-byte big-endian word.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        self.0.to_big_endian(&mut out);
        out
    }

    /// Minimal `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{:x}", self.0)
    }
}

fn parse_hex(digits: &str) -> Result<U256, AmountParseError> {
    if digits.is_empty() {
        return Err(AmountParseError::Empty);
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AmountParseError::InvalidDigit);
    }
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(U256::zero());
    }
    if significant.len() > 64 {
        return Err(AmountParseError::Overflow);
    }
    U256::from_str_radix(significant, 16).map_err(|_| AmountParseError::InvalidDigit)
}

fn parse_decimal(digits: &str) -> Result<U256, AmountParseError> {
    if digits.is_empty() {
        return Err(AmountParseError::Empty);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountParseError::InvalidDigit);
    }
    U256::from_dec_str(digits).map_err(|_| AmountParseError::Overflow)
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Sum of every amount in a distribution.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenTotal(U512);

impl TokenTotal {
    /// Sum a sequence of amounts.
    pub fn from_amounts<'a>(amounts: impl IntoIterator<Item = &'a Amount>) -> Self {
        let sum = amounts
            .into_iter()
            .fold(U512::zero(), |acc, a| acc + U512::from(a.value()));
        Self(sum)
    }

    /// Access the inner value.
    pub fn value(&self) -> U512 {
        self.0
    }

    /// Minimal `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{:x}", self.0)
    }
}

impl fmt::Display for TokenTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TokenTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenTotal({})", self.0)
    }
}

impl Serialize for TokenTotal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TokenTotal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = s.trim().strip_prefix("0x").unwrap_or(s.trim());
        let significant = digits.trim_start_matches('0');
        if significant.is_empty() {
            return Ok(Self(U512::zero()));
        }
        U512::from_str_radix(significant, 16)
            .map(Self)
            .map_err(|_| serde::de::Error::custom(format!("invalid token total: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_decimal() {
        assert_eq!(Amount::parse("0x64").unwrap(), Amount::from(100));
        assert_eq!(Amount::parse("0X64").unwrap(), Amount::from(100));
        assert_eq!(Amount::parse("100").unwrap(), Amount::from(100));
        assert_eq!(Amount::parse(" 0x0064 ").unwrap(), Amount::from(100));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Amount::parse(""), Err(AmountParseError::Empty));
        assert_eq!(Amount::parse("0x"), Err(AmountParseError::Empty));
        assert_eq!(Amount::parse("-5"), Err(AmountParseError::InvalidDigit));
        assert_eq!(Amount::parse("1.5"), Err(AmountParseError::InvalidDigit));
        assert_eq!(Amount::parse("0xzz"), Err(AmountParseError::InvalidDigit));
    }

    #[test]
    fn rejects_values_wider_than_256_bits() {
        let too_wide = format!("0x1{}", "0".repeat(64));
        assert_eq!(Amount::parse(&too_wide), Err(AmountParseError::Overflow));
        let max = format!("0x{}", "f".repeat(64));
        assert_eq!(Amount::parse(&max).unwrap().value(), U256::MAX);
    }

    #[test]
    fn zero_parses_but_is_flagged() {
        assert!(Amount::parse("0").unwrap().is_zero());
        assert!(Amount::parse("0x00").unwrap().is_zero());
    }

    #[test]
    fn big_endian_encoding() {
        let bytes = Amount::from(0x0102).to_be_bytes();
        assert_eq!(bytes[..30], [0u8; 30]);
        assert_eq!(bytes[30], 0x01);
        assert_eq!(bytes[31], 0x02);
    }

    #[test]
    fn hex_is_minimal_lowercase() {
        assert_eq!(Amount::from(255).to_hex(), "0xff");
        assert_eq!(Amount::from(100).to_hex(), "0x64");
    }

    #[test]
    fn token_total_does_not_overflow_u256() {
        let max = Amount::new(U256::MAX);
        let total = TokenTotal::from_amounts([&max, &max]);
        assert!(total.value() > U512::from(U256::MAX));
        assert_eq!(total.to_hex(), format!("0x1{}e", "f".repeat(63)));
    }

    #[test]
    fn token_total_serde() {
        let total = TokenTotal::from_amounts([&Amount::from(100), &Amount::from(200)]);
        let json = serde_json::to_string(&total).unwrap();
        assert_eq!(json, "\"0x12c\"");
        let back: TokenTotal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, total);
    }
}
