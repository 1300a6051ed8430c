//! Core correspondence store: a thread-safe DuckDB wrapper split by table.

mod correspondences;
mod deletes;
mod forwarding;
mod idempotency;
mod notifications;
mod status;

use crate::error::StorageResult;
use crate::schema::initialize_correspondence_schema;
use duckdb::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

/// Thread-safe store for correspondences and their event history.
#[derive(Clone)]
pub struct CorrespondenceStore {
    conn: Arc<Mutex<Connection>>,
}

impl CorrespondenceStore {
    /// Open (or create) the correspondence database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = crate::open_duckdb_with_wal_recovery(path)?;
        initialize_correspondence_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_correspondence_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Acquire the connection lock, recovering from poison.
    pub(crate) fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| {
            warn!("correspondence store recovering from poisoned mutex");
            poisoned.into_inner()
        })
    }

    /// Flush the WAL into the database file.
    pub fn checkpoint(&self) -> StorageResult<()> {
        let conn = self.lock_conn();
        conn.execute_batch("CHECKPOINT")?;
        Ok(())
    }
}
