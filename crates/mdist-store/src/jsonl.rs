//! # JSON-Lines Claim Store
//!
//! One claim record per line. Lines are written in the order given and read
//! back in the same order, so a claims file is also a stable diffable
//! artifact.
//!
//! `bulk_write` never overwrites silently: an existing file is first renamed
//! to `<file>.bk.<UTC timestamp>`.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use mdist_core::ClaimRecord;

use crate::backup::backup_existing;
use crate::error::StoreError;
use crate::repository::{ClaimIter, ClaimRepository};

/// Progress is logged every this many written claims.
const PROGRESS_EVERY: usize = 100_000;

/// File-backed claim repository.
#[derive(Debug, Clone)]
pub struct JsonlClaimStore {
    path: PathBuf,
}

impl JsonlClaimStore {
    /// A store at `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<BufReader<File>, StoreError> {
        File::open(&self.path)
            .map(BufReader::new)
            .map_err(|e| StoreError::io(&self.path, e))
    }
}

impl ClaimRepository for JsonlClaimStore {
    fn count(&self) -> Result<usize, StoreError> {
        let mut count = 0;
        for line in self.open()?.lines() {
            let line = line.map_err(|e| StoreError::io(&self.path, e))?;
            if !line.trim().is_empty() {
                count += 1;
            }
        }
        Ok(count)
    }

    fn iterate(&self) -> Result<ClaimIter<'_>, StoreError> {
        let reader = self.open()?;
        let path = self.path.as_path();
        let iter = reader
            .lines()
            .enumerate()
            .filter_map(move |(n, line)| match line {
                Err(e) => Some(Err(StoreError::io(path, e))),
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => Some(serde_json::from_str::<ClaimRecord>(&line).map_err(|source| {
                    StoreError::Parse {
                        path: path.to_path_buf(),
                        line: n + 1,
                        source,
                    }
                })),
            });
        Ok(Box::new(iter))
    }

    fn bulk_write(&mut self, claims: &[ClaimRecord]) -> Result<(), StoreError> {
        backup_existing(&self.path)?;

        let file = File::create(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        let mut out = BufWriter::new(file);
        for (n, claim) in claims.iter().enumerate() {
            serde_json::to_writer(&mut out, claim).map_err(|source| StoreError::Serialize {
                index: claim.index,
                source,
            })?;
            out.write_all(b"\n")
                .map_err(|e| StoreError::io(&self.path, e))?;
            if (n + 1) % PROGRESS_EVERY == 0 {
                tracing::debug!(written = n + 1, total = claims.len(), "writing claims");
            }
        }
        out.flush().map_err(|e| StoreError::io(&self.path, e))?;

        tracing::info!(path = %self.path.display(), claims = claims.len(), "claims written");
        Ok(())
    }
}
