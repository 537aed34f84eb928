use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::warn;

use crate::db::schema::CREATE_SCHEMA;
use crate::error::Result;
use crate::search::matcher::contains_ignore_case;

/// How long a unit of work waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Name of the SQL function backing case-insensitive substring matching.
pub const CONTAINS_FN: &str = "kb_contains";

/// The record store: one `SQLite` connection shared by all operations.
///
/// Every read or write goes through [`Database::read`] or [`Database::write`],
/// which scope the work to a single transaction. The transaction commits when
/// the closure succeeds and rolls back when it fails or unwinds, so the
/// connection is always released in a clean state.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a database at the given path and apply schema.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Like [`Database::open`] with an explicit lock wait bound.
    pub fn open_with_timeout(path: &Path, busy_timeout: Duration) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;\
             PRAGMA synchronous=NORMAL;\
             PRAGMA cache_size=-64000;\
             PRAGMA temp_store=MEMORY;",
        )?;
        conn.busy_timeout(busy_timeout)?;
        Self::prepare(conn)
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> Result<Self> {
        register_functions(&conn)?;
        conn.execute_batch(CREATE_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Close the underlying connection, surfacing any error from `SQLite`.
    pub fn close(self) -> Result<()> {
        let conn = self
            .conn
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        conn.close().map_err(|(_, e)| e.into())
    }

    /// Run `work` inside a deferred (read) transaction.
    pub fn read<T>(&self, work: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        self.unit_of_work(TransactionBehavior::Deferred, work)
    }

    /// Run `work` inside an immediate (write) transaction.
    pub fn write<T>(&self, work: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        self.unit_of_work(TransactionBehavior::Immediate, work)
    }

    fn unit_of_work<T>(
        &self,
        behavior: TransactionBehavior,
        work: impl FnOnce(&Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        // A panic inside a previous unit of work rolled its transaction back
        // on unwind, so the connection behind a poisoned lock is still usable.
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = conn.transaction_with_behavior(behavior)?;
        match work(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                warn!(error = %e, "unit of work rolled back");
                Err(e)
            }
        }
    }
}

fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        CONTAINS_FN,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack = ctx.get_raw(0).as_str().ok();
            let needle = ctx.get_raw(1).as_str().ok();
            Ok(match (haystack, needle) {
                (Some(h), Some(n)) => contains_ignore_case(h, n),
                _ => false,
            })
        },
    )?;
    Ok(())
}
