//! # Staging Module
//!
//! A disk-backed staging table used to deduplicate, sort, and join hashed
//! column values without holding every column in memory at once.
//!
//! ## Lifecycle
//! The store exists for exactly one pipeline run. It is created at run
//! start under a private, run-scoped temporary directory and physically
//! removed at run end, success or failure. It is never shared across runs.
//!
//! ## Ordering
//! Both query paths return rows ordered lexicographically by plaintext
//! within each column group (SQLite BINARY collation over UTF-8 bytes),
//! which keeps output files byte-for-byte reproducible across runs.

use crate::core::hasher::HashEngine;
use crate::error::StorageError;
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// One staged (column, plaintext, hash) row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingRow {
    pub column_name: String,
    pub plaintext: String,
    pub hash_value: String,
}

/// Run-scoped SQLite staging table
pub struct StagingStore {
    conn: Connection,
    dir: TempDir,
    db_path: PathBuf,
}

impl StagingStore {
    /// Create the staging database under a fresh private directory.
    ///
    /// `location_hint` selects where the directory is created; `None` uses
    /// the system temp location.
    pub fn open(location_hint: Option<&Path>) -> Result<Self, StorageError> {
        let builder = {
            let mut b = tempfile::Builder::new();
            b.prefix("excel-hash-staging-");
            b
        };

        let dir = match location_hint {
            Some(hint) => builder.tempdir_in(hint),
            None => builder.tempdir(),
        }
        .map_err(|e| StorageError::OpenFailed {
            path: location_hint
                .map(Path::to_path_buf)
                .unwrap_or_else(std::env::temp_dir),
            reason: e.to_string(),
        })?;

        let db_path = dir.path().join("staging.db");

        let conn = Connection::open(&db_path).map_err(|e| StorageError::OpenFailed {
            path: db_path.clone(),
            reason: e.to_string(),
        })?;

        // The store is transient; durability across crashes buys nothing here
        conn.execute_batch("PRAGMA journal_mode=MEMORY; PRAGMA synchronous=OFF;")
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        conn.execute(
            "CREATE TABLE staging (
                column_name TEXT NOT NULL,
                plaintext TEXT NOT NULL,
                hash_value TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        // Index matching the query sort order
        conn.execute(
            "CREATE INDEX idx_staging_order ON staging(column_name, plaintext)",
            [],
        )
        .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        debug!(path = %db_path.display(), "staging store created");

        Ok(Self {
            conn,
            dir,
            db_path,
        })
    }

    /// Path of the backing database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Deduplicate one column's raw values, digest each distinct value
    /// once, and persist all rows in a single transaction.
    ///
    /// Returns the number of distinct values staged. The caller must not
    /// append the same column twice within one run.
    pub fn append_distinct(
        &mut self,
        column: &str,
        values: &[String],
        engine: &HashEngine,
    ) -> Result<usize, StorageError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let distinct = {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO staging (column_name, plaintext, hash_value) VALUES (?, ?, ?)",
                )
                .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

            let mut seen: HashSet<&str> = HashSet::new();
            for value in values {
                if seen.insert(value.as_str()) {
                    let hash = engine.digest_hex(value);
                    stmt.execute(params![column, value, hash])
                        .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
                }
            }
            seen.len()
        };

        tx.commit()
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        debug!(column, distinct, raw = values.len(), "column staged");

        Ok(distinct)
    }

    /// Total number of staged rows
    pub fn row_count(&self) -> Result<usize, StorageError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM staging", [], |row| {
                row.get::<_, i64>(0).map(|v| v as usize)
            })
            .map_err(|e| StorageError::QueryFailed(e.to_string()))
    }

    /// Stream every staged row ordered by (column_name, plaintext)
    pub fn for_each_row<F>(&self, mut f: F) -> Result<(), StorageError>
    where
        F: FnMut(StagingRow),
    {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT column_name, plaintext, hash_value FROM staging
                 ORDER BY column_name, plaintext",
            )
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(StagingRow {
                    column_name: row.get(0)?,
                    plaintext: row.get(1)?,
                    hash_value: row.get(2)?,
                })
            })
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        for row in rows {
            f(row.map_err(|e| StorageError::QueryFailed(e.to_string()))?);
        }

        Ok(())
    }

    /// Stream one column's staged rows ordered by plaintext
    pub fn for_each_in_column<F>(&self, column: &str, mut f: F) -> Result<(), StorageError>
    where
        F: FnMut(StagingRow),
    {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT column_name, plaintext, hash_value FROM staging
                 WHERE column_name = ? ORDER BY plaintext",
            )
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map([column], |row| {
                Ok(StagingRow {
                    column_name: row.get(0)?,
                    plaintext: row.get(1)?,
                    hash_value: row.get(2)?,
                })
            })
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        for row in rows {
            f(row.map_err(|e| StorageError::QueryFailed(e.to_string()))?);
        }

        Ok(())
    }

    /// Close the store and remove its backing storage.
    ///
    /// The connection must be dropped before the directory goes away.
    pub fn close(self) -> Result<(), StorageError> {
        let StagingStore { conn, dir, db_path } = self;
        drop(conn);

        debug!(path = %db_path.display(), "removing staging store");

        dir.close().map_err(|e| StorageError::CleanupFailed {
            path: db_path,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hasher::{HashAlgorithm, HashEngine};
    use tempfile::TempDir;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn collect_all(store: &StagingStore) -> Vec<StagingRow> {
        let mut rows = Vec::new();
        store.for_each_row(|row| rows.push(row)).unwrap();
        rows
    }

    #[test]
    fn append_distinct_dedupes_and_sorts() {
        let mut store = StagingStore::open(None).unwrap();
        let engine = HashEngine::new(HashAlgorithm::Sha256);

        let staged = store
            .append_distinct("Name", &strings(&["Bob", "Alice", "Bob", "Alice"]), &engine)
            .unwrap();
        assert_eq!(staged, 2);

        let mut rows = Vec::new();
        store.for_each_in_column("Name", |row| rows.push(row)).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].plaintext, "Alice");
        assert_eq!(rows[1].plaintext, "Bob");
        assert_eq!(rows[0].hash_value, engine.digest_hex("Alice"));
        assert_eq!(rows[1].hash_value, engine.digest_hex("Bob"));

        store.close().unwrap();
    }

    #[test]
    fn rows_sort_by_column_then_plaintext() {
        let mut store = StagingStore::open(None).unwrap();
        let engine = HashEngine::new(HashAlgorithm::Sha256);

        store
            .append_distinct("Zeta", &strings(&["b", "a"]), &engine)
            .unwrap();
        store
            .append_distinct("Alpha", &strings(&["d", "c"]), &engine)
            .unwrap();

        let rows = collect_all(&store);
        let keys: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.column_name.as_str(), r.plaintext.as_str()))
            .collect();

        assert_eq!(
            keys,
            vec![("Alpha", "c"), ("Alpha", "d"), ("Zeta", "a"), ("Zeta", "b")]
        );

        store.close().unwrap();
    }

    #[test]
    fn repeated_queries_return_identical_order() {
        let mut store = StagingStore::open(None).unwrap();
        let engine = HashEngine::new(HashAlgorithm::Sha512);

        store
            .append_distinct("Col", &strings(&["m", "z", "a", "q", "b"]), &engine)
            .unwrap();

        let first = collect_all(&store);
        let second = collect_all(&store);
        assert_eq!(first, second);

        store.close().unwrap();
    }

    #[test]
    fn close_removes_backing_storage() {
        let hint = TempDir::new().unwrap();

        let store = StagingStore::open(Some(hint.path())).unwrap();
        let db_path = store.db_path().to_path_buf();
        assert!(db_path.exists());

        store.close().unwrap();

        assert!(!db_path.exists());
        assert!(!db_path.parent().unwrap().exists());
    }

    #[test]
    fn empty_column_stages_nothing() {
        let mut store = StagingStore::open(None).unwrap();
        let engine = HashEngine::new(HashAlgorithm::Sha256);

        let staged = store.append_distinct("Empty", &[], &engine).unwrap();
        assert_eq!(staged, 0);
        assert_eq!(store.row_count().unwrap(), 0);

        store.close().unwrap();
    }

    #[test]
    fn queries_scope_to_the_requested_column() {
        let mut store = StagingStore::open(None).unwrap();
        let engine = HashEngine::new(HashAlgorithm::Sha256);

        store
            .append_distinct("Name", &strings(&["Alice"]), &engine)
            .unwrap();
        store
            .append_distinct("Email", &strings(&["a@example.com"]), &engine)
            .unwrap();

        let mut rows = Vec::new();
        store.for_each_in_column("Name", |row| rows.push(row)).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].column_name, "Name");

        store.close().unwrap();
    }
}
