//! # Account — Checksummed 20-Byte Identifiers
//!
//! Recipients are identified by a 20-byte account. Externally an account is
//! written as `0x`-prefixed hex with the EIP-55 mixed-case checksum; every
//! comparison, sort and hash uses the raw bytes.
//!
//! ## Parsing Rules
//!
//! - An optional `0x` prefix, then exactly 40 hex digits.
//! - All-lowercase or all-uppercase digits carry no checksum and are accepted.
//! - Mixed-case digits must match the EIP-55 checksum exactly.
//!
//! ## Ordering
//!
//! `Ord` is byte-wise on the 20 bytes. This is the order the normalizer uses
//! to assign claim indices.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

use crate::error::DistributorError;

/// A 20-byte account identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Account([u8; 20]);

impl Account {
    /// Byte length of an account.
    pub const LEN: usize = 20;

    /// Wrap raw account bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Access the raw account bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parse and canonicalize an account string.
    ///
    /// # Errors
    ///
    /// Returns [`DistributorError::InvalidAddress`] if the string is not 40
    /// hex digits (after an optional `0x`), or if it is mixed-case and the
    /// EIP-55 checksum does not match.
    pub fn parse(input: &str) -> Result<Self, DistributorError> {
        let trimmed = input.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if digits.len() != 2 * Self::LEN {
            return Err(invalid(
                input,
                format!("expected 40 hex chars, got {}", digits.len()),
            ));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| invalid(input, format!("invalid hex: {e}")))?;
        let account = Self(bytes);

        let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
        let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
        if has_lower && has_upper && account.checksum_digits() != digits {
            return Err(invalid(input, "bad EIP-55 checksum".to_string()));
        }

        Ok(account)
    }

    /// Render the EIP-55 checksummed form, `0x`-prefixed.
    pub fn to_checksum(&self) -> String {
        format!("0x{}", self.checksum_digits())
    }

    /// The 40 checksummed hex digits, without prefix.
    ///
    /// A letter digit is uppercased when the matching nibble of
    /// `keccak256(lowercase_hex)` is 8 or greater.
    fn checksum_digits(&self) -> String {
        let lower = hex::encode(self.0);
        let digest = Keccak256::digest(lower.as_bytes());
        lower
            .char_indices()
            .map(|(i, c)| {
                let byte = digest[i / 2];
                let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
                if c.is_ascii_alphabetic() && nibble >= 8 {
                    c.to_ascii_uppercase()
                } else {
                    c
                }
            })
            .collect()
    }
}

fn invalid(input: &str, reason: String) -> DistributorError {
    DistributorError::InvalidAddress {
        address: input.to_string(),
        reason,
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account({})", self.to_checksum())
    }
}

impl FromStr for Account {
    type Err = DistributorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Account {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Account {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
