//! SQLite access for the notes backend.
//!
//! There is no shared connection: every operation opens its own handle through
//! [`Database::with_conn`] and the handle is closed when the closure returns.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Result as SqliteResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a connection waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Open (or create) the database file and apply the schema once.
    pub fn new(database_url: &str, schema: &str) -> SqliteResult<Self> {
        let path = PathBuf::from(database_url);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    log::warn!("Failed to create database directory {}: {}", parent.display(), e);
                }
            }
        }

        let db = Self { path };
        db.with_conn(|conn| conn.execute_batch(schema))?;
        log::info!("Schema applied to {}", db.path.display());

        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against a fresh connection. The connection is dropped, and so
    /// closed, as soon as `f` returns, on success and on error alike.
    pub fn with_conn<T, F>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&Connection) -> SqliteResult<T>,
    {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        log::debug!("Opened connection to {}", self.path.display());
        f(&conn)
    }
}

/// Current time at the precision timestamps are stored with
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 so that string order in SQL is chronological order
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp, reporting failures against column `idx`
pub fn parse_timestamp(idx: usize, raw: &str) -> SqliteResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_new_creates_parent_dir_and_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("notes.db");

        let db = Database::new(db_path.to_str().unwrap(), crate::config::BUNDLED_SCHEMA)
            .expect("Failed to create database");

        assert!(db_path.exists());
        let count: i64 = db
            .with_conn(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'notes'",
                    [],
                    |row| row.get(0),
                )
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_new_fails_when_parent_is_not_a_directory() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let db_path = blocker.join("notes.db");

        let result = Database::new(db_path.to_str().unwrap(), crate::config::BUNDLED_SCHEMA);
        assert!(result.is_err());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("notes.db");
        let url = db_path.to_str().unwrap();

        Database::new(url, crate::config::BUNDLED_SCHEMA).unwrap();
        Database::new(url, crate::config::BUNDLED_SCHEMA).expect("Second schema run should succeed");
    }

    #[test]
    fn test_with_conn_propagates_errors() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("notes.db");
        let db = Database::new(db_path.to_str().unwrap(), crate::config::BUNDLED_SCHEMA).unwrap();

        let result = db.with_conn(|conn| conn.execute("SELECT * FROM missing_table", []));
        assert!(result.is_err());
    }

    #[test]
    fn test_timestamp_format_is_sortable() {
        let earlier = parse_timestamp(0, "2024-01-01T00:00:00.000001Z").unwrap();
        let later = parse_timestamp(0, "2024-01-01T00:00:00.100000Z").unwrap();

        let a = format_timestamp(&earlier);
        let b = format_timestamp(&later);
        assert!(a < b);
        assert_eq!(a.len(), b.len());
        assert_eq!(parse_timestamp(0, &a).unwrap(), earlier);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp(3, "not a date").is_err());
    }
}
