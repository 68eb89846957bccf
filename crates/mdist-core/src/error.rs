//! # Error Types — Distributor Failure Taxonomy
//!
//! Defines the error type used throughout the distributor. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Normalization and build errors are fatal: the caller aborts the run and
//!   no partial commitment is ever written.
//! - Verification errors (`ProofVerification`, `RootMismatch`) are collected
//!   per claim by the verifier and surfaced together at the end of a run.
//! - Library code never terminates the process. The CLI driver maps these
//!   errors to exit codes.

use thiserror::Error;

use crate::account::Account;
use crate::hash::Hash32;

/// Top-level error type for the distributor.
#[derive(Error, Debug)]
pub enum DistributorError {
    /// The account string is not a 20-byte hex identifier, or its mixed-case
    /// checksum does not match.
    #[error("invalid address {address}: {reason}")]
    InvalidAddress {
        /// The account string as it appeared in the input.
        address: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Two input records canonicalize to the same account.
    #[error("duplicate address: {address}")]
    DuplicateAddress {
        /// The canonical account that repeats.
        address: Account,
    },

    /// The amount does not parse, is zero, or does not fit in 256 bits.
    #[error("invalid amount {value:?} for account {account}: {reason}")]
    InvalidAmount {
        /// The account the amount belongs to.
        account: String,
        /// The raw amount value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The input has the wrong shape, is empty, or cannot be read.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A single claim's proof does not fold to the published root.
    #[error("proof verification failed for claim {index} ({account})")]
    ProofVerification {
        /// Index of the failing claim.
        index: u64,
        /// Account of the failing claim.
        account: Account,
    },

    /// The root rebuilt from the full claim set differs from the published root.
    #[error("root mismatch: published {published}, reconstructed {reconstructed}")]
    RootMismatch {
        /// Root read from the published tree metadata.
        published: Hash32,
        /// Root rebuilt from the claim set.
        reconstructed: Hash32,
    },

    /// A proof was requested for a leaf position the tree does not have.
    #[error("leaf index {index} is out of range for a tree with {leaves} leaves")]
    LeafOutOfRange {
        /// Requested position.
        index: usize,
        /// Number of leaves in the tree.
        leaves: usize,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DistributorError {
    /// True for the two verification-time failures, which are collected
    /// rather than aborting a run.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::ProofVerification { .. } | Self::RootMismatch { .. }
        )
    }
}
