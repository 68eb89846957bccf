//! # mdist-verify — Independent Claim Verifier
//!
//! Confirms that a published root and a set of claims agree, using only the
//! claims themselves. An auditor who does not trust the generator can run
//! this crate alone.
//!
//! ## Checks
//!
//! 1. **Per-claim proof**: recompute the claim's leaf hash, fold its proof
//!    into it and compare with the published root. Every claim is checked;
//!    a failure does not stop the run.
//! 2. **Root reconstruction**: hash every claim, sort, drop duplicates and
//!    rebuild the root from scratch. This catches what per-claim checks
//!    cannot, such as a claim silently left out of the published set.
//!
//! A distribution is valid only if both checks pass. The two failures are
//! reported separately.
//!
//! ## Crate Policy
//!
//! - The hashing and layering code here is a second, separately written
//!   implementation. It must not import `mdist-tree`.
//! - No shared mutable state. Each call owns its working buffers.

mod hashing;
pub mod proof;
pub mod reconstruct;
pub mod report;

pub use proof::{verify_claim, verify_proof};
pub use reconstruct::reconstruct_root;
pub use report::{verify_distribution, DistributionVerifier, FailedClaim, VerificationReport};
