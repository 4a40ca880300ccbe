//! DuckDB world-state implementation
//!
//! Plays the ledger's state database for a local peer. Values are stored as
//! raw blobs keyed by their world-state key.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use duckdb::{params, Connection};

use crate::migrations::MIGRATIONS;
use crate::ports::{StateStore, StoreError, StoreResult};
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when the database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("could not set lock on file")
        || lower.contains("file is already open")
}

pub struct DuckDbStateStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbStateStore {
    /// Open (or create) the world-state database at `db_path`
    ///
    /// Another peer process may hold the file briefly, so lock errors are
    /// retried with exponential backoff before giving up.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        tracing::warn!(
                            attempt = attempt + 1,
                            max = MAX_RETRIES,
                            delay_ms = delay.as_millis() as u64,
                            "world state busy, retrying: {}",
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow!("Failed to open database after {} retries", MAX_RETRIES)))
    }

    /// World state that lives only as long as this value
    pub fn open_in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading stays off; nothing here needs an extension
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))
    }

    /// Run pending world-state migrations
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn, MIGRATIONS).run_pending()
    }

    /// Ensure the world-state schema exists
    pub fn ensure_schema(&self) -> Result<()> {
        let result = self.run_migrations()?;
        if !result.applied.is_empty() {
            tracing::debug!(applied = ?result.applied, "world state migrations applied");
        }
        Ok(())
    }

    /// Path of the backing file, `None` for in-memory state
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Number of keys in world state
    pub fn key_count(&self) -> Result<i64> {
        let conn = self.lock()?;
        let count = conn.query_row("SELECT COUNT(*) FROM world_state", [], |row| row.get(0))?;
        Ok(count)
    }

    /// All entries whose key starts with `prefix`, ordered by key
    pub fn entries_with_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT state_key, state_value FROM world_state
             WHERE starts_with(state_key, ?)
             ORDER BY state_key",
        )?;

        let entries = stmt
            .query_map([prefix], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<(String, Vec<u8>)>, _>>()?;

        Ok(entries)
    }
}

impl StateStore for DuckDbStateStore {
    fn get_state(&self, key: &str) -> StoreResult<Vec<u8>> {
        let conn = self.lock().map_err(StoreError::unavailable)?;
        let result = conn.query_row(
            "SELECT state_value FROM world_state WHERE state_key = ?",
            [key],
            |row| row.get::<_, Vec<u8>>(0),
        );

        match result {
            Ok(value) => Ok(value),
            Err(duckdb::Error::QueryReturnedNoRows) => Err(StoreError::NotFound(key.to_string())),
            Err(e) => Err(StoreError::unavailable(e)),
        }
    }

    fn put_state(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let conn = self.lock().map_err(StoreError::unavailable)?;
        conn.execute(
            "INSERT OR REPLACE INTO world_state (state_key, state_value, updated_at)
             VALUES (?, ?, CURRENT_TIMESTAMP)",
            params![key, value],
        )
        .map_err(StoreError::unavailable)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DuckDbStateStore {
        let store = DuckDbStateStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        store
    }

    #[test]
    fn test_missing_key_is_not_found() {
        let store = store();
        assert_eq!(
            store.get_state("acct:nobody"),
            Err(StoreError::NotFound("acct:nobody".to_string()))
        );
    }

    #[test]
    fn test_put_replaces_value() {
        let store = store();
        store.put_state("color", b"red").unwrap();
        store.put_state("color", b"blue").unwrap();

        assert_eq!(store.get_state("color").unwrap(), b"blue".to_vec());
        assert_eq!(store.key_count().unwrap(), 1);
    }

    #[test]
    fn test_empty_value_is_stored() {
        let store = store();
        store.put_state("acct:ghost", b"").unwrap();
        assert_eq!(store.get_state("acct:ghost").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_entries_with_prefix() {
        let store = store();
        store.put_state("acct:bob", b"{}").unwrap();
        store.put_state("acct:alice", b"{}").unwrap();
        store.put_state("hello_world", b"hi").unwrap();

        let keys: Vec<String> = store
            .entries_with_prefix("acct:")
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["acct:alice".to_string(), "acct:bob".to_string()]);
    }

    #[test]
    fn test_schema_is_idempotent() {
        let store = store();
        let result = store.run_migrations().unwrap();
        assert!(result.applied.is_empty());
    }
}
