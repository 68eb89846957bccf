//! # Merkle Tree Construction
//!
//! ## Algorithm
//!
//! 1. Hash every leaf (in parallel).
//! 2. Sort the leaf hashes byte-wise and drop adjacent duplicates. This is
//!    layer 0; the published root is defined over this order, which is what
//!    lets an auditor rebuild it from the claim set alone.
//! 3. Pair consecutive nodes with [`combine`]; an odd trailing node passes
//!    through. Repeat until one node remains.
//!
//! Every layer is kept so proofs are read straight out of memory.
//!
//! ## Proofs
//!
//! For a leaf at layer-0 position `p`, each layer contributes the node at
//! `p ^ 1` when it exists and nothing when it does not (the pass-through
//! case), then `p` moves to `p / 2`. Siblings are listed leaf-side first.

use rayon::prelude::*;
use sha3::{Digest, Keccak256};

use mdist_core::{Account, Amount, DistributorError, Hash32};

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Compute a leaf hash: `keccak256(uint256(index) || account || uint256(amount))`.
pub fn leaf_hash(index: u64, account: &Account, amount: &Amount) -> Hash32 {
    let mut index_word = [0u8; 32];
    index_word[24..].copy_from_slice(&index.to_be_bytes());
    let digest = Keccak256::new()
        .chain_update(index_word)
        .chain_update(account.as_bytes())
        .chain_update(amount.to_be_bytes())
        .finalize();
    Hash32::new(digest.into())
}

/// Combine two sibling nodes: `keccak256(min(a, b) || max(a, b))`.
///
/// Commutative: `combine(a, b) == combine(b, a)`.
pub fn combine(a: &Hash32, b: &Hash32) -> Hash32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let digest = Keccak256::new()
        .chain_update(lo.as_bytes())
        .chain_update(hi.as_bytes())
        .finalize();
    Hash32::new(digest.into())
}

fn next_layer(layer: &[Hash32]) -> Vec<Hash32> {
    layer
        .par_chunks(2)
        .map(|pair| match pair.get(1) {
            Some(right) => combine(&pair[0], right),
            None => pair[0],
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// One leaf of the tree: a claim without its proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeLeaf {
    /// Claim index.
    pub index: u64,
    /// Recipient.
    pub account: Account,
    /// Claimable amount.
    pub amount: Amount,
}

impl TreeLeaf {
    /// This leaf's hash.
    pub fn hash(&self) -> Hash32 {
        leaf_hash(self.index, &self.account, &self.amount)
    }
}

/// A fully built Merkle tree with every layer retained.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// `layers[0]` is the sorted leaf layer; the last layer holds the root.
    layers: Vec<Vec<Hash32>>,
    /// Layer-0 position of each input leaf, in input order.
    positions: Vec<usize>,
}

impl MerkleTree {
    /// Build a tree over `leaves`.
    ///
    /// Input order does not affect the root; it only decides which input
    /// position [`MerkleTree::proof_for`] refers to.
    ///
    /// # Errors
    ///
    /// Returns [`DistributorError::MalformedInput`] for an empty leaf set.
    pub fn build(leaves: &[TreeLeaf]) -> Result<Self, DistributorError> {
        let hashes: Vec<Hash32> = leaves.par_iter().map(TreeLeaf::hash).collect();
        Self::from_leaf_hashes(hashes)
    }

    /// Build a tree over precomputed leaf hashes.
    pub fn from_leaf_hashes(hashes: Vec<Hash32>) -> Result<Self, DistributorError> {
        if hashes.is_empty() {
            return Err(DistributorError::MalformedInput(
                "cannot build a Merkle tree with no leaves".to_string(),
            ));
        }

        let mut sorted = hashes.clone();
        sorted.par_sort_unstable();
        sorted.dedup();

        // Every input hash is present in the sorted layer by construction.
        let positions = hashes
            .iter()
            .map(|h| sorted.binary_search(h).unwrap_or_else(|p| p))
            .collect();

        tracing::debug!(leaves = sorted.len(), "building Merkle layers");
        let mut layers = vec![sorted];
        while let Some(top) = layers.last().filter(|l| l.len() > 1) {
            let next = next_layer(top);
            tracing::trace!(layer = layers.len(), nodes = next.len(), "layer complete");
            layers.push(next);
        }

        Ok(Self { layers, positions })
    }

    /// The Merkle root.
    pub fn root(&self) -> Hash32 {
        // `from_leaf_hashes` guarantees a non-empty final layer of length one.
        self.layers
            .last()
            .and_then(|top| top.first())
            .copied()
            .unwrap_or_default()
    }

    /// Number of input leaves.
    pub fn leaf_count(&self) -> usize {
        self.positions.len()
    }

    /// All layers, leaf layer first.
    pub fn layers(&self) -> &[Vec<Hash32>] {
        &self.layers
    }

    /// Proof for the leaf at input position `i`.
    ///
    /// # Errors
    ///
    /// Returns [`DistributorError::LeafOutOfRange`] if `i` is past the last leaf.
    pub fn proof_for(&self, i: usize) -> Result<Vec<Hash32>, DistributorError> {
        let position = *self
            .positions
            .get(i)
            .ok_or(DistributorError::LeafOutOfRange {
                index: i,
                leaves: self.positions.len(),
            })?;
        Ok(self.proof_at(position))
    }

    /// Proof for a leaf identified by its hash, if the tree contains it.
    pub fn proof_for_hash(&self, leaf: &Hash32) -> Option<Vec<Hash32>> {
        let position = self.layers[0].binary_search(leaf).ok()?;
        Some(self.proof_at(position))
    }

    fn proof_at(&self, mut position: usize) -> Vec<Hash32> {
        let mut proof = Vec::with_capacity(self.layers.len().saturating_sub(1));
        for layer in &self.layers[..self.layers.len() - 1] {
            if let Some(sibling) = layer.get(position ^ 1) {
                proof.push(*sibling);
            }
            position /= 2;
        }
        proof
    }
}
