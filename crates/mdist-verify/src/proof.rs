//! # Single-Proof Verification
//!
//! Folds a proof left to right into the claim's leaf hash and compares the
//! result with the root byte for byte.

use mdist_core::{Account, Amount, ClaimRecord, Hash32};

use crate::hashing::{claim_leaf, node_hash};

/// Check one claim's proof against `root`.
pub fn verify_proof(
    index: u64,
    account: &Account,
    amount: &Amount,
    proof: &[Hash32],
    root: &Hash32,
) -> bool {
    let mut acc = claim_leaf(index, account, amount);
    for sibling in proof {
        // Both sides are present, so the pair hash always exists.
        if let Some(parent) = node_hash(Some(&acc), Some(sibling)) {
            acc = parent;
        }
    }
    acc == *root
}

/// Check a persisted claim record against `root`.
pub fn verify_claim(claim: &ClaimRecord, root: &Hash32) -> bool {
    verify_proof(
        claim.index,
        &claim.address,
        &claim.amount,
        &claim.proof,
        root,
    )
}
