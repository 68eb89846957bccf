//! # mdist-cli — Merkle Distributor CLI
//!
//! Provides the `mdist` command-line interface. Each subcommand is a thin
//! driver over the library crates: it reads files, calls one library
//! operation, writes files, and turns the outcome into an exit code.
//!
//! ## Subcommands
//!
//! - `mdist generate`: balances file to tree metadata and claims.
//! - `mdist verify`: check a claims file against a published root.
//! - `mdist export`: upload claims to a key-value namespace.
//!
//! ```bash
//! mdist generate --input balances.json --info-out distributor.json
//! mdist verify --root balances.tree.json --claims balances.claims.sqlite
//! mdist export --claims balances.claims.sqlite --namespace-identifier ns
//! ```
//!
//! Handlers return `Ok(0)` on success and `Ok(1)` when the operation ran but
//! its result is a failure (for example a verification mismatch).
//! Operational errors come back as `Err` and also exit 1.

pub mod export;
pub mod generate;
pub mod verify;
