//! DuckDB storage layer for the correspondence event ledger.
//!
//! # Architecture
//!
//! - Correspondences are stored as JSON blobs; external references live in
//!   their own table so they can grow without rewriting the blob
//! - Status, notification, forwarding and delete events are append-only tables
//! - Every event table carries a unique constraint over its deduplication key;
//!   inserts use `INSERT OR IGNORE` and report whether a row was created
//! - Timestamps are stored as microseconds since the epoch, with a
//!   whole-second column alongside for keys that tolerate sub-second jitter

mod error;
pub mod keys;
mod schema;
mod store;

pub use error::{StorageError, StorageResult};
pub use schema::initialize_correspondence_schema;
pub use store::CorrespondenceStore;

use tracing::warn;

/// Result of an insert-or-ignore against a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    DuplicateIgnored,
}

impl InsertOutcome {
    pub(crate) fn from_changes(changed: usize) -> Self {
        if changed == 0 {
            Self::DuplicateIgnored
        } else {
            Self::Created
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created)
    }
}

/// Open a DuckDB connection, removing a stale WAL and retrying once if the
/// first open fails.
pub fn open_duckdb_with_wal_recovery(path: &std::path::Path) -> StorageResult<duckdb::Connection> {
    match duckdb::Connection::open(path) {
        Ok(conn) => Ok(conn),
        Err(first_err) => {
            let wal_path = path.with_extension(
                path.extension()
                    .map(|ext| format!("{}.wal", ext.to_string_lossy()))
                    .unwrap_or_else(|| "wal".to_string()),
            );
            if wal_path.exists() {
                warn!(
                    wal = %wal_path.display(),
                    "correspondence store open failed, removing stale WAL and retrying"
                );
                if std::fs::remove_file(&wal_path).is_ok() {
                    return duckdb::Connection::open(path).map_err(Into::into);
                }
            }
            Err(first_err.into())
        }
    }
}
