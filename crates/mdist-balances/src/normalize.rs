//! # Normalization
//!
//! Validates raw records and produces the canonical leaf set:
//!
//! 1. Canonicalize each account; reject invalid and duplicate accounts.
//! 2. Parse each amount; reject anything unparseable, zero, or wider than
//!    256 bits.
//! 3. Derive flags from the free-text reasons.
//! 4. Sort ascending by account bytes and assign `index` = position.
//!
//! The first invalid record aborts the run. No partial leaf set is returned.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use mdist_core::{Account, Amount, ClaimFlags, DistributorError};

use crate::input::RawBalances;

/// Flag names and the substring each one is derived from.
const FLAG_KEYWORDS: [(&str, &str); 3] =
    [("isSOCKS", "socks"), ("isLP", "lp"), ("isUser", "user")];

/// A validated, indexed balance: a claim without its proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedBalance {
    /// Position in ascending account order.
    pub index: u64,
    /// Canonical account.
    pub account: Account,
    /// Positive amount.
    pub amount: Amount,
    /// Flags derived from reasons, if any reasons were given.
    pub flags: Option<ClaimFlags>,
}

/// Derive membership flags by case-insensitive substring match.
///
/// Returns `None` for empty reasons so the claim carries no flags at all.
pub fn derive_flags(reasons: &str) -> Option<ClaimFlags> {
    if reasons.is_empty() {
        return None;
    }
    let lowered = reasons.to_lowercase();
    Some(
        FLAG_KEYWORDS
            .iter()
            .map(|(flag, keyword)| (flag.to_string(), lowered.contains(keyword)))
            .collect(),
    )
}

/// Validate, deduplicate, sort and index raw balances.
///
/// # Errors
///
/// - [`DistributorError::MalformedInput`] for an empty input.
/// - [`DistributorError::InvalidAddress`] for an unparseable account.
/// - [`DistributorError::DuplicateAddress`] when two records share an account.
/// - [`DistributorError::InvalidAmount`] for an unparseable or zero amount.
pub fn normalize(raw: RawBalances) -> Result<Vec<NormalizedBalance>, DistributorError> {
    if raw.is_empty() {
        return Err(DistributorError::MalformedInput(
            "balance input contains no entries".to_string(),
        ));
    }

    let records = raw.into_records();
    let total = records.len();
    tracing::info!(records = total, "normalizing balances");

    let mut by_account: BTreeMap<Account, (Amount, Option<ClaimFlags>)> = BTreeMap::new();
    for (i, record) in records.into_iter().enumerate() {
        let account = Account::parse(&record.address)?;
        let Entry::Vacant(slot) = by_account.entry(account) else {
            return Err(DistributorError::DuplicateAddress { address: account });
        };

        let amount = Amount::parse(&record.earnings).map_err(|e| {
            DistributorError::InvalidAmount {
                account: record.address.clone(),
                value: record.earnings.clone(),
                reason: e.to_string(),
            }
        })?;
        if amount.is_zero() {
            return Err(DistributorError::InvalidAmount {
                account: record.address,
                value: record.earnings,
                reason: "amount must be greater than zero".to_string(),
            });
        }
        slot.insert((amount, derive_flags(&record.reasons)));

        if (i + 1) % 100_000 == 0 {
            tracing::debug!(processed = i + 1, total, "processing balances");
        }
    }

    // BTreeMap iteration is ascending by account bytes.
    let normalized: Vec<NormalizedBalance> = by_account
        .into_iter()
        .enumerate()
        .map(|(index, (account, (amount, flags)))| NormalizedBalance {
            index: index as u64,
            account,
            amount,
            flags,
        })
        .collect();

    tracing::info!(recipients = normalized.len(), "balances normalized");
    Ok(normalized)
}
