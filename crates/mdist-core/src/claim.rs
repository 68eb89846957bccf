//! # Claim Records and Published Metadata
//!
//! The shapes that leave a generation run and come back for verification:
//!
//! - `ClaimRecord`: one per recipient, keyed by index, carrying its proof.
//! - `TreeInfo`: the published root with `tokenTotal` and `recipientsCount`.
//! - `DistributorInfo`: root, total and every claim in one document.
//!
//! JSON field names match the published formats (`tokenTotal`,
//! `recipientsCount`, `merkleRoot`), so records written by older tooling
//! deserialize unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::amount::{Amount, TokenTotal};
use crate::hash::Hash32;

/// Categorical flags derived from a record's free-text reasons.
pub type ClaimFlags = BTreeMap<String, bool>;

/// A persisted claim: everything a recipient needs to prove inclusion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Position of the account in ascending account order.
    pub index: u64,
    /// The recipient.
    pub address: Account,
    /// The claimable amount.
    pub amount: Amount,
    /// Sibling hashes from the leaf-adjacent level up to the root-adjacent level.
    pub proof: Vec<Hash32>,
    /// Optional membership flags. Absent when the input carried no reasons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<ClaimFlags>,
}

/// Published tree metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeInfo {
    /// The Merkle root.
    pub root: Hash32,
    /// Sum of all amounts. Not part of the commitment.
    pub token_total: TokenTotal,
    /// Number of claims.
    pub recipients_count: u64,
}

/// The complete output of a generation run.
///
/// Sufficient on its own to recreate the entire tree: anyone holding it can
/// check that every claim is included and that the tree has no extra leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributorInfo {
    /// The Merkle root.
    pub merkle_root: Hash32,
    /// Sum of all amounts.
    pub token_total: TokenTotal,
    /// Every claim, in index order.
    pub claims: Vec<ClaimRecord>,
}

impl DistributorInfo {
    /// The metadata record published alongside the claims.
    pub fn tree_info(&self) -> TreeInfo {
        TreeInfo {
            root: self.merkle_root,
            token_total: self.token_total,
            recipients_count: self.claims.len() as u64,
        }
    }
}
