//! # mdist-store — Claim Persistence and Export
//!
//! The I/O side of a distribution. Nothing in here computes hashes; the
//! tree builder and the verifier only ever see `ClaimRecord` values.
//!
//! - [`ClaimRepository`]: `count`, `iterate`, `bulk_write`. The only
//!   storage surface the CLI uses.
//! - [`SqliteClaimStore`]: the `claims` table of a SQLite database, the
//!   default claims artifact.
//! - [`JsonlClaimStore`]: one JSON claim record per line on disk.
//! - [`MemoryClaimStore`]: an in-process store for tests and pipelines.
//! - [`KvUploader`]: batched upload of claims to a remote key-value
//!   namespace, keyed by checksummed address.

mod backup;
pub mod config;
pub mod error;
pub mod export;
pub mod jsonl;
pub mod repository;
mod retry;
pub mod sqlite;

pub use config::{ConfigError, KvConfig, KvOverrides};
pub use error::{ExportError, StoreError};
pub use export::{KvPair, KvUploader, DEFAULT_BATCH_SIZE};
pub use jsonl::JsonlClaimStore;
pub use repository::{open_claim_store, ClaimIter, ClaimRepository, MemoryClaimStore};
pub use sqlite::SqliteClaimStore;
