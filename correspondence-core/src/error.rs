//! Service error types.

use correspondence_dialog::DialogError;
use correspondence_ledger::LedgerError;
use correspondence_storage::StorageError;
use thiserror::Error;

/// Result type for service operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Dialog(#[from] DialogError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Whether the request can never succeed as sent.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::Ledger(err) => err.is_client_error(),
            Self::Dialog(DialogError::Validation(_)) => true,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Ledger(LedgerError::NotFound(_))
                | Self::Dialog(DialogError::NotFound(_))
                | Self::Dialog(DialogError::Ledger(LedgerError::NotFound(_)))
        )
    }
}
