//! # mdist-tree — Merkle Tree Builder
//!
//! Builds the commitment over a normalized leaf set and hands out one
//! inclusion proof per claim.
//!
//! ## Hashing Scheme
//!
//! - Leaf: `keccak256(uint256(index) || address || uint256(amount))`, the
//!   Solidity `abi.encodePacked` layout.
//! - Node: `keccak256(min(a, b) || max(a, b))`. Sorting the pair makes the
//!   combination commutative, so proofs carry no left/right markers.
//! - An odd trailing node is promoted to the next layer unchanged.
//!
//! Leaf and node hashes share one hash function with no domain tag. The
//! scheme is kept exactly as published so existing verifiers keep working.
//!
//! ## Crate Policy
//!
//! - `mdist-verify` re-implements the same math on its own. Do not make it
//!   depend on this crate, and do not move this math into `mdist-core`.
//! - Layers are built with `rayon`; each layer is complete before the next
//!   one starts.

pub mod builder;
pub mod distributor;

pub use builder::{combine, leaf_hash, MerkleTree, TreeLeaf};
pub use distributor::{build_distribution, generate_distribution};
