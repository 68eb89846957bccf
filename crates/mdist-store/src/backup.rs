//! Rename-to-backup for store files that are about to be rewritten.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::StoreError;

/// Move an existing file to `<file>.bk.<UTC timestamp>`.
///
/// Returns the backup path, or `None` when there was nothing to move.
pub(crate) fn backup_existing(path: &Path) -> Result<Option<PathBuf>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
    let mut name = path.to_path_buf().into_os_string();
    name.push(format!(".bk.{stamp}"));
    let backup = PathBuf::from(name);
    fs::rename(path, &backup).map_err(|e| StoreError::io(path, e))?;
    tracing::info!(from = %path.display(), to = %backup.display(), "backed up existing claims file");
    Ok(Some(backup))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_needs_no_backup() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(backup_existing(&dir.path().join("absent")).unwrap(), None);
    }

    #[test]
    fn existing_file_is_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("claims.sqlite");
        fs::write(&path, b"old").unwrap();
        let backup = backup_existing(&path).unwrap().unwrap();
        assert!(!path.exists());
        assert_eq!(fs::read(&backup).unwrap(), b"old");
        assert!(backup
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("claims.sqlite.bk."));
    }
}
