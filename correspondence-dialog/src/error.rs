//! Dialog mirror error types.

use correspondence_ledger::LedgerError;
use thiserror::Error;

/// Result type for dialog operations.
pub type DialogResult<T> = Result<T, DialogError>;

/// Errors that can occur while mirroring into the dialog system.
#[derive(Debug, Error)]
pub enum DialogError {
    /// Non-success response from the dialog system. Surfaced, never retried here.
    #[error("dialog system returned {status}: {body}")]
    ExternalSystem { status: u16, body: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<correspondence_storage::StorageError> for DialogError {
    fn from(err: correspondence_storage::StorageError) -> Self {
        Self::Ledger(LedgerError::Storage(err))
    }
}
