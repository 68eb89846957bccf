//! # SQLite Claim Store
//!
//! The claims database layout distributions are published with: one
//! `claims` table keyed by claim index.
//!
//! ```sql
//! CREATE TABLE claims (id INTEGER PRIMARY KEY, address TEXT, amount TEXT, proof TEXT, flags TEXT)
//! ```
//!
//! `address` is the checksummed account, `amount` minimal `0x` hex, `proof`
//! a JSON array of hex hashes and `flags` a JSON object or NULL. Databases
//! written without the `flags` column read back with no flags.
//!
//! The repository contract is synchronous, so the store owns a
//! current-thread runtime and blocks on each query. Reads are paged by key,
//! so `iterate` holds at most one page of rows in memory.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use mdist_core::{Account, Amount, ClaimFlags, ClaimRecord, Hash32};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
use sqlx::{ConnectOptions, Connection, SqliteConnection};
use tokio::runtime::Runtime;

use crate::backup::backup_existing;
use crate::error::StoreError;
use crate::repository::{ClaimIter, ClaimRepository};

/// Rows fetched per query while iterating.
const PAGE_SIZE: i64 = 10_000;

/// Progress is logged every this many written claims.
const PROGRESS_EVERY: usize = 100_000;

const CREATE_TABLE: &str = "CREATE TABLE claims \
     (id INTEGER PRIMARY KEY, address TEXT, amount TEXT, proof TEXT, flags TEXT)";

const INSERT_CLAIM: &str =
    "INSERT INTO claims (id, address, amount, proof, flags) VALUES (?, ?, ?, ?, ?)";

const SELECT_PAGE: &str = "SELECT * FROM claims WHERE id >= ? ORDER BY id LIMIT ?";

/// SQLite-backed claim repository.
#[derive(Debug)]
pub struct SqliteClaimStore {
    path: PathBuf,
    runtime: Runtime,
}

impl SqliteClaimStore {
    /// A store at `path`. The database need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::io(&path, e))?;
        Ok(Self { path, runtime })
    }

    /// Backing database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_read(&self) -> Result<SqliteConnection, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::io(
                &self.path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "claims database not found"),
            ));
        }
        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .read_only(true);
        self.runtime
            .block_on(options.connect())
            .map_err(|e| StoreError::database(&self.path, e))
    }

    fn open_write(&self) -> Result<SqliteConnection, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Memory)
            .synchronous(SqliteSynchronous::Off);
        self.runtime
            .block_on(options.connect())
            .map_err(|e| StoreError::database(&self.path, e))
    }
}

impl ClaimRepository for SqliteClaimStore {
    fn count(&self) -> Result<usize, StoreError> {
        let mut conn = self.open_read()?;
        let count = self
            .runtime
            .block_on(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM claims").fetch_one(&mut conn))
            .map_err(|e| StoreError::database(&self.path, e))?;
        Ok(count.max(0) as usize)
    }

    fn iterate(&self) -> Result<ClaimIter<'_>, StoreError> {
        let conn = self.open_read()?;
        Ok(Box::new(ClaimPages {
            store: self,
            conn,
            next_id: i64::MIN,
            buffer: VecDeque::new(),
            exhausted: false,
        }))
    }

    fn bulk_write(&mut self, claims: &[ClaimRecord]) -> Result<(), StoreError> {
        let rows = claims
            .iter()
            .map(ClaimRow::from_record)
            .collect::<Result<Vec<_>, _>>()?;

        backup_existing(&self.path)?;
        let mut conn = self.open_write()?;
        let total = rows.len();

        self.runtime
            .block_on(async move {
                sqlx::query(CREATE_TABLE).execute(&mut conn).await?;
                let mut tx = conn.begin().await?;
                for (n, row) in rows.iter().enumerate() {
                    sqlx::query(INSERT_CLAIM)
                        .bind(row.id)
                        .bind(row.address.as_str())
                        .bind(row.amount.as_str())
                        .bind(row.proof.as_str())
                        .bind(row.flags.as_deref())
                        .execute(&mut *tx)
                        .await?;
                    if (n + 1) % PROGRESS_EVERY == 0 {
                        tracing::debug!(written = n + 1, total, "writing claims");
                    }
                }
                tx.commit().await?;
                conn.close().await
            })
            .map_err(|e| StoreError::database(&self.path, e))?;

        tracing::info!(path = %self.path.display(), claims = total, "claims written");
        Ok(())
    }
}

/// Keyset-paged reader over the `claims` table.
struct ClaimPages<'a> {
    store: &'a SqliteClaimStore,
    conn: SqliteConnection,
    next_id: i64,
    buffer: VecDeque<ClaimRow>,
    exhausted: bool,
}

impl ClaimPages<'_> {
    fn fetch_page(&mut self) -> Result<(), StoreError> {
        let rows = self
            .store
            .runtime
            .block_on(
                sqlx::query_as::<_, ClaimRow>(SELECT_PAGE)
                    .bind(self.next_id)
                    .bind(PAGE_SIZE)
                    .fetch_all(&mut self.conn),
            )
            .map_err(|e| StoreError::database(&self.store.path, e))?;

        if (rows.len() as i64) < PAGE_SIZE {
            self.exhausted = true;
        }
        if let Some(last) = rows.last() {
            match last.id.checked_add(1) {
                Some(next) => self.next_id = next,
                None => self.exhausted = true,
            }
        }
        self.buffer.extend(rows);
        Ok(())
    }
}

impl Iterator for ClaimPages<'_> {
    type Item = Result<ClaimRecord, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        let row = self.buffer.pop_front()?;
        Some(row.into_record(&self.store.path))
    }
}

/// Internal row type for SQLx mapping.
#[derive(Debug, sqlx::FromRow)]
struct ClaimRow {
    id: i64,
    address: String,
    amount: String,
    proof: String,
    #[sqlx(default)]
    flags: Option<String>,
}

impl ClaimRow {
    fn from_record(claim: &ClaimRecord) -> Result<Self, StoreError> {
        let id = i64::try_from(claim.index)
            .map_err(|_| StoreError::IndexOutOfRange { index: claim.index })?;
        let serialize = |source| StoreError::Serialize {
            index: claim.index,
            source,
        };
        let proof = serde_json::to_string(&claim.proof).map_err(serialize)?;
        let flags = claim
            .flags
            .as_ref()
            .map(|f| serde_json::to_string(f))
            .transpose()
            .map_err(serialize)?;
        Ok(Self {
            id,
            address: claim.address.to_checksum(),
            amount: claim.amount.to_hex(),
            proof,
            flags,
        })
    }

    fn into_record(self, path: &Path) -> Result<ClaimRecord, StoreError> {
        let id = self.id;
        let corrupt = |reason: String| StoreError::Corrupt {
            path: path.to_path_buf(),
            id,
            reason,
        };

        let index = u64::try_from(id).map_err(|_| corrupt("negative id".to_string()))?;
        let address = Account::parse(&self.address).map_err(|e| corrupt(e.to_string()))?;
        let amount = Amount::parse(&self.amount)
            .map_err(|e| corrupt(format!("amount {:?}: {e}", self.amount)))?;
        let proof: Vec<Hash32> =
            serde_json::from_str(&self.proof).map_err(|e| corrupt(format!("proof: {e}")))?;
        let flags = self
            .flags
            .as_deref()
            .map(serde_json::from_str::<ClaimFlags>)
            .transpose()
            .map_err(|e| corrupt(format!("flags: {e}")))?;

        Ok(ClaimRecord {
            index,
            address,
            amount,
            proof,
            flags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn claim(index: u64) -> ClaimRecord {
        ClaimRecord {
            index,
            address: Account::from_bytes([index as u8 + 1; 20]),
            amount: Amount::from(1_000 * (index + 1)),
            proof: vec![Hash32::new([index as u8; 32]), Hash32::new([0xee; 32])],
            flags: None,
        }
    }

    /// Build a database in the four-column layout, without `flags`.
    fn write_legacy(path: &Path, rows: &[(i64, &str, &str, &str)]) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let mut conn = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .connect()
                .await
                .unwrap();
            sqlx::query(
                "CREATE TABLE claims (id INTEGER PRIMARY KEY, address TEXT, amount TEXT, proof TEXT)",
            )
            .execute(&mut conn)
            .await
            .unwrap();
            for (id, address, amount, proof) in rows {
                sqlx::query("INSERT INTO claims VALUES (?, ?, ?, ?)")
                    .bind(*id)
                    .bind(*address)
                    .bind(*amount)
                    .bind(*proof)
                    .execute(&mut conn)
                    .await
                    .unwrap();
            }
            conn.close().await.unwrap();
        });
    }

    #[test]
    fn write_then_read_preserves_order_and_flags() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SqliteClaimStore::new(dir.path().join("claims.sqlite")).unwrap();
        let mut claims: Vec<_> = (0..5).map(claim).collect();
        claims[3].flags = Some(ClaimFlags::from([
            ("isLP".to_string(), true),
            ("isUser".to_string(), false),
        ]));

        store.bulk_write(&claims).unwrap();
        assert_eq!(store.count().unwrap(), 5);
        assert_eq!(store.load_all().unwrap(), claims);
    }

    #[test]
    fn rewrite_backs_up_previous_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SqliteClaimStore::new(dir.path().join("claims.sqlite")).unwrap();
        store.bulk_write(&[claim(0)]).unwrap();
        store.bulk_write(&[claim(1), claim(2)]).unwrap();

        let backups: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("claims.sqlite.bk."))
            .collect();
        assert_eq!(backups.len(), 1);
        let old = SqliteClaimStore::new(backups[0].path()).unwrap();
        assert_eq!(old.load_all().unwrap(), vec![claim(0)]);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn reads_four_column_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.sqlite");
        let proof = format!(r#"["{}"]"#, Hash32::new([0xab; 32]));
        write_legacy(
            &path,
            &[
                (1, "0x2222222222222222222222222222222222222222", "0xc8", proof.as_str()),
                (0, "0x1111111111111111111111111111111111111111", "0x64", "[]"),
            ],
        );

        let claims = SqliteClaimStore::new(&path).unwrap().load_all().unwrap();
        assert_eq!(claims.len(), 2);
        assert_eq!(claims[0].index, 0);
        assert_eq!(claims[0].amount, Amount::from(100));
        assert!(claims[0].proof.is_empty());
        assert_eq!(claims[1].proof, vec![Hash32::new([0xab; 32])]);
        assert!(claims.iter().all(|c| c.flags.is_none()));
    }

    #[test]
    fn iteration_crosses_page_boundaries() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SqliteClaimStore::new(dir.path().join("claims.sqlite")).unwrap();
        let total = PAGE_SIZE as u64 + 3;
        let claims: Vec<_> = (0..total)
            .map(|index| ClaimRecord {
                index,
                address: Account::from_bytes([(index % 251) as u8; 20]),
                amount: Amount::from(index + 1),
                proof: Vec::new(),
                flags: None,
            })
            .collect();
        store.bulk_write(&claims).unwrap();

        let indices: Vec<u64> = store.iterate().unwrap().map(|c| c.unwrap().index).collect();
        assert_eq!(indices, (0..total).collect::<Vec<_>>());
    }

    #[test]
    fn bad_row_is_reported_with_its_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.sqlite");
        write_legacy(
            &path,
            &[(7, "0x1111111111111111111111111111111111111111", "zz", "[]")],
        );
        let err = SqliteClaimStore::new(&path).unwrap().load_all().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { id: 7, .. }), "{err}");
    }

    #[test]
    fn missing_database_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteClaimStore::new(dir.path().join("absent.sqlite")).unwrap();
        assert!(matches!(store.count(), Err(StoreError::Io { .. })));
    }
}
