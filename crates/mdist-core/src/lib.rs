//! # mdist-core — Foundational Types for the Merkle Distributor
//!
//! This crate defines the data model shared by every other crate in the
//! workspace: the values that flow from raw balance input, through the tree
//! builder, into persisted claims, and back out to the independent verifier.
//! It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Account`, `Amount` and
//!    `Hash32` have validated constructors. No bare strings or byte slices
//!    cross a crate boundary.
//!
//! 2. **Equality on canonical bytes.** Two account strings are the same
//!    account iff they decode to the same 20 bytes. Checksummed hex is only
//!    the external representation.
//!
//! 3. **One error taxonomy.** `DistributorError` names every failure the
//!    normalizer, builder and verifier can report, so the CLI driver can
//!    decide exit codes without string matching.
//!
//! 4. **No tree math here.** Leaf hashing and pairwise combination live in
//!    `mdist-tree` and, written separately, in `mdist-verify`. This crate
//!    only carries the values they hash.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mdist-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod account;
pub mod amount;
pub mod claim;
pub mod error;
pub mod hash;

// Re-export primary types for ergonomic imports.
pub use account::Account;
pub use amount::{Amount, AmountParseError, TokenTotal};
pub use claim::{ClaimFlags, ClaimRecord, DistributorInfo, TreeInfo};
pub use error::DistributorError;
pub use hash::Hash32;
