//! # mdist-balances — Balance Normalization
//!
//! Turns raw balance input into the ordered leaf set the tree builder
//! consumes. Leaf ordering decides every proof, so the output of this crate
//! must be byte-for-byte reproducible from the same input.
//!
//! ## Input Shapes
//!
//! - **Map**: `{ "<account>": <number | hex string> }`. String balances are
//!   hex digits with or without `0x`; numbers keep their full precision.
//! - **Records**: `[{ "address", "earnings", "reasons" }]`
//! - **Table**: rows of `[account, amount]`, from CSV or JSON
//!
//! ## Output
//!
//! A `Vec<NormalizedBalance>` sorted ascending by account bytes, with
//! `index` equal to position. Any invalid record aborts the whole run.
//!
//! ## Crate Policy
//!
//! - Depends only on `mdist-core` internally.
//! - Knows nothing about hashing or trees.

pub mod input;
pub mod normalize;

pub use input::{BalanceRecord, RawAmount, RawBalances};
pub use normalize::{derive_flags, normalize, NormalizedBalance};
