//! Connection handling for the `SQLite` store.

use crate::{Error, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Busy timeout applied to every connection, in milliseconds.
pub const BUSY_TIMEOUT_MS: u32 = 5000;

/// Acquires the connection mutex, recovering from poison.
///
/// A panic inside a previous critical section leaves the connection itself
/// usable, so the guard is recovered, logged and counted.
pub fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("SQLite mutex was poisoned, recovering");
            metrics::counter!("sqlite_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Opens a database file, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the directory or database cannot be
/// created.
pub fn open_connection(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
            operation: "create_data_dir".to_string(),
            cause: format!("{}: {e}", parent.display()),
        })?;
    }
    Connection::open(path).map_err(|e| Error::OperationFailed {
        operation: "open_sqlite".to_string(),
        cause: e.to_string(),
    })
}

/// Applies WAL journaling, NORMAL synchronous mode and the busy timeout.
///
/// `journal_mode` answers with a row, so pragmas go through
/// `pragma_update` rather than `execute_batch`. In-memory databases silently
/// keep the `memory` journal mode.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the busy timeout cannot be set.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    let _ = conn.pragma_update(None, "journal_mode", "WAL");
    let _ = conn.pragma_update(None, "synchronous", "NORMAL");
    conn.pragma_update(None, "busy_timeout", BUSY_TIMEOUT_MS)
        .map_err(|e| Error::OperationFailed {
            operation: "configure_connection".to_string(),
            cause: e.to_string(),
        })
}

/// Runs `body` inside a `BEGIN IMMEDIATE` transaction.
///
/// Commits on success and rolls back on error.
///
/// # Errors
///
/// Returns the body's error, or [`Error::OperationFailed`] if the
/// transaction cannot be opened or committed.
pub fn with_transaction<T>(conn: &Connection, body: impl FnOnce() -> Result<T>) -> Result<T> {
    conn.execute("BEGIN IMMEDIATE", [])
        .map_err(|e| Error::OperationFailed {
            operation: "begin_transaction".to_string(),
            cause: e.to_string(),
        })?;

    let result = body();

    if result.is_ok() {
        conn.execute("COMMIT", []).map_err(|e| Error::OperationFailed {
            operation: "commit_transaction".to_string(),
            cause: e.to_string(),
        })?;
    } else {
        let _ = conn.execute("ROLLBACK", []);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_acquire_lock_concurrent() {
        let mutex = Arc::new(Mutex::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let mutex = Arc::clone(&mutex);
                thread::spawn(move || {
                    *acquire_lock(&mutex) += 1;
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(*acquire_lock(&mutex), 8);
    }

    #[test]
    fn test_acquire_lock_recovers_from_poison() {
        let mutex = Arc::new(Mutex::new(1));
        let poisoner = Arc::clone(&mutex);
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the mutex");
        })
        .join();

        assert!(mutex.is_poisoned());
        assert_eq!(*acquire_lock(&mutex), 1);
    }

    #[test]
    fn test_configure_connection() {
        let conn = Connection::open_in_memory().unwrap();
        configure_connection(&conn).unwrap();

        let synchronous: i32 = conn
            .pragma_query_value(None, "synchronous", |row| row.get(0))
            .unwrap();
        assert_eq!(synchronous, 1);

        let busy_timeout: i32 = conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))
            .unwrap();
        assert_eq!(busy_timeout, 5000);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE t (v INTEGER)", []).unwrap();

        let result: Result<()> = with_transaction(&conn, || {
            conn.execute("INSERT INTO t (v) VALUES (1)", []).unwrap();
            Err(Error::InvalidInput("abort".to_string()))
        });
        assert!(result.is_err());

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_open_connection_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("aimind.db");
        assert!(open_connection(&path).is_ok());
        assert!(path.exists());
    }
}
