//! # Claim Repository Contract
//!
//! Claims are produced once per run and read back later. The repository
//! contract is the only thing the CLI knows about storage:
//!
//! - `count`: number of stored claims.
//! - `iterate`: stream claims in stored order.
//! - `bulk_write`: replace the stored claims with a new set.
//!
//! [`open_claim_store`] picks the on-disk engine from the file name.

use std::path::Path;

use mdist_core::ClaimRecord;

use crate::error::StoreError;
use crate::jsonl::JsonlClaimStore;
use crate::sqlite::SqliteClaimStore;

/// A stream of stored claims.
pub type ClaimIter<'a> = Box<dyn Iterator<Item = Result<ClaimRecord, StoreError>> + 'a>;

/// Storage for a distribution's claims.
pub trait ClaimRepository {
    /// Number of stored claims.
    fn count(&self) -> Result<usize, StoreError>;

    /// Stream stored claims in stored order.
    fn iterate(&self) -> Result<ClaimIter<'_>, StoreError>;

    /// Replace the stored claims with `claims`.
    fn bulk_write(&mut self, claims: &[ClaimRecord]) -> Result<(), StoreError>;

    /// Read every claim into memory.
    fn load_all(&self) -> Result<Vec<ClaimRecord>, StoreError> {
        self.iterate()?.collect()
    }
}

/// Open the store at `path`: `.jsonl` files are JSON Lines, anything else is
/// a SQLite database.
pub fn open_claim_store(path: &Path) -> Result<Box<dyn ClaimRepository>, StoreError> {
    let is_jsonl = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"));
    if is_jsonl {
        Ok(Box::new(JsonlClaimStore::new(path)))
    } else {
        Ok(Box::new(SqliteClaimStore::new(path)?))
    }
}

/// Vector-backed repository.
#[derive(Debug, Clone, Default)]
pub struct MemoryClaimStore {
    claims: Vec<ClaimRecord>,
}

impl MemoryClaimStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClaimRepository for MemoryClaimStore {
    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.claims.len())
    }

    fn iterate(&self) -> Result<ClaimIter<'_>, StoreError> {
        Ok(Box::new(self.claims.iter().cloned().map(Ok)))
    }

    fn bulk_write(&mut self, claims: &[ClaimRecord]) -> Result<(), StoreError> {
        self.claims = claims.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdist_core::{Account, Amount};

    fn claim(index: u64) -> ClaimRecord {
        ClaimRecord {
            index,
            address: Account::from_bytes([index as u8; 20]),
            amount: Amount::from(index + 1),
            proof: Vec::new(),
            flags: None,
        }
    }

    #[test]
    fn memory_store_replaces_on_write() {
        let mut store = MemoryClaimStore::new();
        assert_eq!(store.count().unwrap(), 0);
        store.bulk_write(&[claim(0), claim(1)]).unwrap();
        assert_eq!(store.count().unwrap(), 2);
        store.bulk_write(&[claim(5)]).unwrap();
        assert_eq!(store.load_all().unwrap(), vec![claim(5)]);
    }

    #[test]
    fn engine_follows_extension() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["claims.jsonl", "claims.sqlite", "claims.db"] {
            let path = dir.path().join(name);
            let mut store = open_claim_store(&path).unwrap();
            store.bulk_write(&[claim(0), claim(1)]).unwrap();
            assert_eq!(store.load_all().unwrap(), vec![claim(0), claim(1)]);
        }
        let text = std::fs::read_to_string(dir.path().join("claims.jsonl")).unwrap();
        assert_eq!(text.lines().count(), 2);
        let header = std::fs::read(dir.path().join("claims.sqlite")).unwrap();
        assert!(header.starts_with(b"SQLite format 3"));
    }
}
