//! Transition rules for interactive status changes.
//!
//! Rules are evaluated against a snapshot of facts derived from the history
//! rather than against the latest status alone: "confirm" needs a Fetched
//! event anywhere in the history, not a Fetched current status.

use correspondence_storage::{CorrespondenceStore, StorageResult};
use correspondence_types::{CorrespondenceId, CorrespondenceStatus, DeleteEventType};
use thiserror::Error;

/// Why an interactive transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionViolation {
    #[error("correspondence is already initialized")]
    AlreadyInitialized,

    #[error("expected current status {expected}")]
    OutOfSequence { expected: CorrespondenceStatus },

    #[error("correspondence is not published")]
    NotPublished,

    #[error("correspondence must be fetched before it is read")]
    ReadBeforeFetched,

    #[error("correspondence must be fetched before it is confirmed")]
    ConfirmBeforeFetched,

    #[error("correspondence must be confirmed before it is archived")]
    ArchiveBeforeConfirmed,

    #[error("correspondence is not soft deleted")]
    RestoreWithoutSoftDelete,

    #[error("correspondence is already published")]
    FailedAfterPublish,
}

/// What the history says about one correspondence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusFacts {
    pub current: Option<CorrespondenceStatus>,
    pub published: bool,
    pub fetched: bool,
    pub confirmed: bool,
    pub soft_deleted: bool,
    pub purged: bool,
}

impl StatusFacts {
    pub fn load(store: &CorrespondenceStore, id: &CorrespondenceId) -> StorageResult<Self> {
        Ok(Self {
            current: store.latest_status_event(id)?.map(|e| e.status),
            published: store.has_status(id, CorrespondenceStatus::Published)?,
            fetched: store.has_status(id, CorrespondenceStatus::Fetched)?,
            confirmed: store.has_status(id, CorrespondenceStatus::Confirmed)?,
            soft_deleted: store.latest_bin_event(id)? == Some(DeleteEventType::SoftDeletedByRecipient),
            purged: store.is_purged(id)?,
        })
    }

    /// Checks whether `to` may be appended. Purge state is handled by the
    /// caller before this point.
    pub fn check(&self, to: CorrespondenceStatus, confirmation_needed: bool) -> Result<(), TransitionViolation> {
        use CorrespondenceStatus::*;

        match to {
            Initialized => match self.current {
                None => Ok(()),
                Some(_) => Err(TransitionViolation::AlreadyInitialized),
            },
            ReadyForPublish => self.expect_current(Initialized),
            Published => self.expect_current(ReadyForPublish),
            Fetched | AttachmentsDownloaded => {
                if self.published {
                    Ok(())
                } else {
                    Err(TransitionViolation::NotPublished)
                }
            }
            Read if !self.fetched => Err(TransitionViolation::ReadBeforeFetched),
            Confirmed if !self.fetched => Err(TransitionViolation::ConfirmBeforeFetched),
            Read | Confirmed => Ok(()),
            Archived => {
                if !confirmation_needed || self.confirmed {
                    Ok(())
                } else {
                    Err(TransitionViolation::ArchiveBeforeConfirmed)
                }
            }
            SoftDeletedByRecipient | PurgedByRecipient | PurgedByAltinn => Ok(()),
            RestoredByRecipient => {
                if self.soft_deleted {
                    Ok(())
                } else {
                    Err(TransitionViolation::RestoreWithoutSoftDelete)
                }
            }
            Failed => {
                if self.published {
                    Err(TransitionViolation::FailedAfterPublish)
                } else {
                    Ok(())
                }
            }
        }
    }

    fn expect_current(&self, expected: CorrespondenceStatus) -> Result<(), TransitionViolation> {
        if self.current == Some(expected) {
            Ok(())
        } else {
            Err(TransitionViolation::OutOfSequence { expected })
        }
    }
}
