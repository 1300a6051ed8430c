//! Ledger error types.

use crate::transitions::TransitionViolation;
use correspondence_storage::StorageError;
use correspondence_types::{CorrespondenceId, CorrespondenceStatus};
use thiserror::Error;

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors that can occur in ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed or empty input. Never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Well-formed but disallowed status change.
    #[error("invalid transition to {to} for {correspondence_id}: {violation}")]
    InvalidTransition {
        correspondence_id: CorrespondenceId,
        to: CorrespondenceStatus,
        violation: TransitionViolation,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl LedgerError {
    pub(crate) fn correspondence_not_found(id: &CorrespondenceId) -> Self {
        Self::NotFound(format!("correspondence {id}"))
    }

    /// Whether the caller sent something that can never succeed as-is.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidTransition { .. } | Self::NotFound(_)
        )
    }
}
