//! Snapshot persistence.
//!
//! [`SnapshotStore`] owns the snapshot for the lifetime of a run:
//! opened once at run start, updated per table with a full
//! replacement, and flushed to disk as an idempotent whole-file
//! overwrite after each table's migrations are written. Keeping it an
//! explicitly passed object (rather than process-wide state) lets the
//! diff engine be tested against in-memory snapshots.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{MigrateError, Result};
use crate::snapshot::{Snapshot, TableColumns};

/// Loads, holds, and persists the schema snapshot.
#[derive(Debug)]
pub struct SnapshotStore {
    path: PathBuf,
    snapshot: Snapshot,
}

impl SnapshotStore {
    /// Opens the snapshot at `path`, initializing an empty snapshot
    /// when the file does not exist yet (first run).
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::Persistence`] when the file exists but
    /// cannot be read, and [`MigrateError::Serialization`] when it is
    /// not valid snapshot JSON.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let snapshot = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(source) if source.kind() == ErrorKind::NotFound => Snapshot::new(),
            Err(source) => {
                return Err(MigrateError::Persistence {
                    path: path.clone(),
                    source,
                });
            }
        };
        Ok(Self { path, snapshot })
    }

    /// Returns the snapshot file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the whole in-memory snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Looks up one table's last-known columns.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableColumns> {
        self.snapshot.table(name)
    }

    /// Replaces one table's entry wholesale. Either the full new state
    /// lands or (if the caller bails first) nothing does.
    pub fn apply(&mut self, table: impl Into<String>, columns: TableColumns) {
        self.snapshot.set_table(table, columns);
    }

    /// Writes the snapshot back to disk, overwriting the whole file.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::Persistence`] when the file cannot be
    /// written.
    pub fn flush(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.snapshot)?;
        fs::write(&self.path, text).map_err(|source| MigrateError::Persistence {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ColumnDef;

    #[test]
    fn missing_file_initializes_empty_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path().join("_snapshot.json")).unwrap();
        assert!(store.snapshot().tables.is_empty());
    }

    #[test]
    fn apply_and_flush_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_snapshot.json");

        let mut store = SnapshotStore::open(&path).unwrap();
        let mut users = TableColumns::new();
        users.insert(
            "id".to_string(),
            ColumnDef::new("INTEGER").not_null().primary_key(),
        );
        store.apply("users", users.clone());
        store.flush().unwrap();

        let reopened = SnapshotStore::open(&path).unwrap();
        assert_eq!(reopened.table("users"), Some(&users));
        assert_eq!(reopened.table("posts"), None);
    }

    #[test]
    fn flush_overwrites_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_snapshot.json");

        let mut store = SnapshotStore::open(&path).unwrap();
        store.apply("stale", TableColumns::new());
        store.flush().unwrap();

        let mut store = SnapshotStore::open(&path).unwrap();
        store.snapshot = Snapshot::new();
        store.apply("fresh", TableColumns::new());
        store.flush().unwrap();

        let reopened = SnapshotStore::open(&path).unwrap();
        assert!(reopened.table("stale").is_none());
        assert!(reopened.table("fresh").is_some());
    }

    #[test]
    fn corrupt_snapshot_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_snapshot.json");
        fs::write(&path, "not json").unwrap();

        let err = SnapshotStore::open(&path).unwrap_err();
        assert!(matches!(err, MigrateError::Serialization(_)));
    }
}
