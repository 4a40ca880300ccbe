//! Logging service - invocation audit log in DuckDB
//!
//! Records one event per invocation in `logs.duckdb`: the function name, the
//! entry point, how many arguments were passed and the error message if the
//! call failed. Argument values and state payloads are never stored.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use duckdb::Connection;
use serde::{Deserialize, Serialize};

use crate::domain::EntryPoint;
use crate::log_migrations::LOG_MIGRATIONS;
use crate::services::MigrationService;

/// Counter for generating unique IDs within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique ID based on timestamp + counter
fn generate_id() -> u64 {
    // Lower 16 bits: counter (65536 ids per millisecond)
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    ((now_ms() as u64) << 16) | counter
}

/// Current unix timestamp in milliseconds
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// An invocation event to be recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    pub entry_point: EntryPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl LogEvent {
    pub fn new(event: impl Into<String>, entry_point: EntryPoint) -> Self {
        Self {
            event: event.into(),
            entry_point,
            function: None,
            arg_count: None,
            error_message: None,
        }
    }

    /// Set the invoked function and its argument count
    pub fn with_function(mut self, function: impl Into<String>, arg_count: usize) -> Self {
        self.function = Some(function.into());
        self.arg_count = Some(arg_count);
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// A log entry as stored in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub entry_point: String,
    pub chaincode_version: String,
    pub event: String,
    pub function: Option<String>,
    pub arg_count: Option<i32>,
    pub error_message: Option<String>,
}

/// Call and failure counts for one chaincode function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionStats {
    pub function: String,
    pub calls: u64,
    pub failures: u64,
}

pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    chaincode_version: String,
}

impl LoggingService {
    /// Open or create `logs.duckdb` in `chaincode_dir` and run its migrations
    pub fn new(chaincode_dir: &Path, chaincode_version: impl Into<String>) -> Result<Self> {
        let db_path = chaincode_dir.join("logs.duckdb");
        let conn = Connection::open(&db_path)?;
        MigrationService::new(&conn, LOG_MIGRATIONS).run_pending()?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            chaincode_version: chaincode_version.into(),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))
    }

    /// Record an event
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO invocation_log (
                id, timestamp, entry_point, chaincode_version,
                event, function_name, arg_count, error_message
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            duckdb::params![
                generate_id(),
                now_ms(),
                event.entry_point.as_str(),
                &self.chaincode_version,
                &event.event,
                &event.function,
                event.arg_count.map(|n| n as i32),
                &event.error_message,
            ],
        )?;

        Ok(())
    }

    /// Record a successful invocation
    pub fn log_invocation(&self, entry_point: EntryPoint, function: &str, arg_count: usize) -> Result<()> {
        self.log(LogEvent::new("invocation_succeeded", entry_point).with_function(function, arg_count))
    }

    /// Record a failed invocation
    pub fn log_failure(
        &self,
        entry_point: EntryPoint,
        function: &str,
        arg_count: usize,
        message: &str,
    ) -> Result<()> {
        self.log(
            LogEvent::new("invocation_failed", entry_point)
                .with_function(function, arg_count)
                .with_error(message),
        )
    }

    /// Most recent entries, newest first
    pub fn get_recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.select_entries("", limit)
    }

    /// Most recent failed invocations, newest first
    pub fn get_errors(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.select_entries("WHERE error_message IS NOT NULL", limit)
    }

    fn select_entries(&self, filter: &str, limit: usize) -> Result<Vec<LogEntry>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT id, timestamp, entry_point, chaincode_version,
                   event, function_name, arg_count, error_message
            FROM invocation_log
            {}
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
            filter
        ))?;

        let entries = stmt
            .query_map([limit as i64], |row| {
                Ok(LogEntry {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    entry_point: row.get(2)?,
                    chaincode_version: row.get(3)?,
                    event: row.get(4)?,
                    function: row.get(5)?,
                    arg_count: row.get(6)?,
                    error_message: row.get(7)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(entries)
    }

    /// Total number of log entries
    pub fn count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM invocation_log", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Calls and failures per invoked function, busiest first
    pub fn function_stats(&self) -> Result<Vec<FunctionStats>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT function_name, COUNT(*) AS calls, COUNT(error_message) AS failures
            FROM invocation_log
            WHERE function_name IS NOT NULL
            GROUP BY function_name
            ORDER BY calls DESC, function_name
            "#,
        )?;

        let stats = stmt
            .query_map([], |row| {
                Ok(FunctionStats {
                    function: row.get(0)?,
                    calls: row.get::<_, i64>(1)? as u64,
                    failures: row.get::<_, i64>(2)? as u64,
                })
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;

        Ok(stats)
    }

    /// Delete entries older than `timestamp_ms` (unix ms)
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM invocation_log WHERE timestamp < ?",
            [timestamp_ms],
        )?;
        Ok(deleted as u64)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_logging_service_creation() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), "0.1.0").unwrap();
        assert!(service.db_path().exists());
    }

    #[test]
    fn test_log_invocation() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), "0.1.0").unwrap();

        service.log_invocation(EntryPoint::Invoke, "createAccount", 1).unwrap();

        let entries = service.get_recent(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "invocation_succeeded");
        assert_eq!(entries[0].entry_point, "invoke");
        assert_eq!(entries[0].function.as_deref(), Some("createAccount"));
        assert_eq!(entries[0].arg_count, Some(1));
        assert_eq!(entries[0].chaincode_version, "0.1.0");
    }

    #[test]
    fn test_log_failure() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), "0.1.0").unwrap();

        service.log_invocation(EntryPoint::Query, "read", 1).unwrap();
        service
            .log_failure(EntryPoint::Invoke, "createAccount", 1, "Can't reinitialize existing user bob")
            .unwrap();

        let errors = service.get_errors(10).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].event, "invocation_failed");
        assert_eq!(
            errors[0].error_message.as_deref(),
            Some("Can't reinitialize existing user bob")
        );
    }

    #[test]
    fn test_count_and_delete() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), "0.1.0").unwrap();

        service.log(LogEvent::new("peer_started", EntryPoint::Init)).unwrap();
        service.log_invocation(EntryPoint::Init, "init", 1).unwrap();
        service.log_invocation(EntryPoint::Invoke, "write", 2).unwrap();
        assert_eq!(service.count().unwrap(), 3);

        let deleted = service.delete_before(now_ms() + 1000).unwrap();
        assert_eq!(deleted, 3);
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_function_stats() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), "0.1.0").unwrap();

        service.log(LogEvent::new("peer_started", EntryPoint::Init)).unwrap();
        service.log_invocation(EntryPoint::Invoke, "createAccount", 1).unwrap();
        service
            .log_failure(EntryPoint::Invoke, "createAccount", 1, "Can't reinitialize existing user bob")
            .unwrap();
        service
            .log_failure(EntryPoint::Query, "write", 2, "query cannot run write")
            .unwrap();

        let stats = service.function_stats().unwrap();
        assert_eq!(
            stats,
            vec![
                FunctionStats {
                    function: "createAccount".to_string(),
                    calls: 2,
                    failures: 1,
                },
                FunctionStats {
                    function: "write".to_string(),
                    calls: 1,
                    failures: 1,
                },
            ]
        );
    }

    #[test]
    fn test_reopen_keeps_entries() {
        let dir = tempdir().unwrap();
        {
            let service = LoggingService::new(dir.path(), "0.1.0").unwrap();
            service.log_invocation(EntryPoint::Invoke, "write", 2).unwrap();
        }
        let service = LoggingService::new(dir.path(), "0.1.0").unwrap();
        assert_eq!(service.count().unwrap(), 1);
    }
}
