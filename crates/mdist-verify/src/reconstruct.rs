//! # Root Reconstruction
//!
//! Rebuilds the root from the complete leaf set: hash every claim, sort the
//! hashes, drop adjacent duplicates, then pair nodes layer by layer until
//! one remains. Claim order in the input has no effect on the result.

use mdist_core::{ClaimRecord, Hash32};

use crate::hashing::{claim_leaf, node_hash};

/// Rebuild the root from a set of claims.
///
/// Returns `None` for an empty claim set.
pub fn reconstruct_root<'a>(claims: impl IntoIterator<Item = &'a ClaimRecord>) -> Option<Hash32> {
    let leaves = claims
        .into_iter()
        .map(|c| claim_leaf(c.index, &c.address, &c.amount))
        .collect();
    root_from_leaf_hashes(leaves)
}

/// Rebuild the root from unsorted leaf hashes.
pub(crate) fn root_from_leaf_hashes(mut nodes: Vec<Hash32>) -> Option<Hash32> {
    nodes.sort();
    nodes.dedup();

    while nodes.len() > 1 {
        let mut parents = Vec::with_capacity(nodes.len().div_ceil(2));
        for i in (0..nodes.len()).step_by(2) {
            parents.push(node_hash(nodes.get(i), nodes.get(i + 1))?);
        }
        nodes = parents;
    }
    nodes.pop()
}
