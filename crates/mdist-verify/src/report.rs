//! # Distribution Verification Run
//!
//! Checks every claim's proof without stopping at the first failure, then
//! reconstructs the root once from the full set. The report keeps the two
//! outcomes apart: a failed proof points at a corrupt or mismatched claim,
//! and a root mismatch means the published root does not commit to this
//! claim set as a whole.
//!
//! [`DistributionVerifier`] accepts claims one at a time, so a caller can
//! stream them from storage. Only leaf hashes are retained for the
//! reconstruction step.

use mdist_core::{Account, ClaimRecord, DistributorError, Hash32};

use crate::hashing::claim_leaf;
use crate::proof::verify_proof;
use crate::reconstruct::root_from_leaf_hashes;

/// A claim whose proof did not fold to the published root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedClaim {
    /// Claim index.
    pub index: u64,
    /// Claim account.
    pub account: Account,
}

/// The outcome of a full verification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    /// Root read from the published metadata.
    pub published_root: Hash32,
    /// Number of claims checked.
    pub checked: usize,
    /// Claims whose proofs failed, in the order they were checked.
    pub failures: Vec<FailedClaim>,
    /// Root rebuilt from the claim set, `None` if there were no claims.
    pub reconstructed_root: Option<Hash32>,
}

impl VerificationReport {
    /// True if every individual proof verified.
    pub fn proofs_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// True if the reconstructed root equals the published root.
    pub fn root_matches(&self) -> bool {
        self.reconstructed_root == Some(self.published_root)
    }

    /// True if every proof verified and the roots match.
    pub fn is_valid(&self) -> bool {
        self.proofs_valid() && self.root_matches()
    }

    /// Every failure as a typed error: one `ProofVerification` per failing
    /// claim, then `RootMismatch` (or `MalformedInput` for an empty set).
    pub fn errors(&self) -> Vec<DistributorError> {
        let mut errors: Vec<DistributorError> = self
            .failures
            .iter()
            .map(|f| DistributorError::ProofVerification {
                index: f.index,
                account: f.account,
            })
            .collect();
        match self.reconstructed_root {
            None => errors.push(DistributorError::MalformedInput(
                "claim set is empty; no root to reconstruct".to_string(),
            )),
            Some(reconstructed) if reconstructed != self.published_root => {
                errors.push(DistributorError::RootMismatch {
                    published: self.published_root,
                    reconstructed,
                })
            }
            Some(_) => {}
        }
        errors
    }
}

/// Incremental verifier for a published root.
#[derive(Debug)]
pub struct DistributionVerifier {
    root: Hash32,
    checked: usize,
    failures: Vec<FailedClaim>,
    leaves: Vec<Hash32>,
}

impl DistributionVerifier {
    /// Start a run against `published_root`.
    pub fn new(published_root: Hash32) -> Self {
        Self {
            root: published_root,
            checked: 0,
            failures: Vec::new(),
            leaves: Vec::new(),
        }
    }

    /// Check one claim's proof and remember its leaf for reconstruction.
    ///
    /// Returns whether this claim's proof verified.
    pub fn check(&mut self, claim: &ClaimRecord) -> bool {
        self.checked += 1;
        self.leaves
            .push(claim_leaf(claim.index, &claim.address, &claim.amount));

        let ok = verify_proof(
            claim.index,
            &claim.address,
            &claim.amount,
            &claim.proof,
            &self.root,
        );
        if !ok {
            tracing::warn!(
                index = claim.index,
                account = %claim.address,
                "proof verification failed"
            );
            self.failures.push(FailedClaim {
                index: claim.index,
                account: claim.address,
            });
        }
        ok
    }

    /// Number of claims checked so far.
    pub fn checked(&self) -> usize {
        self.checked
    }

    /// Reconstruct the root and produce the report.
    pub fn finish(self) -> VerificationReport {
        let reconstructed_root = root_from_leaf_hashes(self.leaves);
        if let Some(root) = reconstructed_root {
            tracing::info!(reconstructed = %root, matches = root == self.root, "root reconstructed");
        }
        VerificationReport {
            published_root: self.root,
            checked: self.checked,
            failures: self.failures,
            reconstructed_root,
        }
    }
}

/// Verify a complete claim set against a published root.
pub fn verify_distribution<'a>(
    published_root: Hash32,
    claims: impl IntoIterator<Item = &'a ClaimRecord>,
) -> VerificationReport {
    let mut verifier = DistributionVerifier::new(published_root);
    for claim in claims {
        verifier.check(claim);
    }
    verifier.finish()
}
