//! Correspondence status enumeration.

use serde::{Deserialize, Serialize};

/// Lifecycle status recorded in the append-only status history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorrespondenceStatus {
    Initialized,
    ReadyForPublish,
    Published,
    Fetched,
    Read,
    Confirmed,
    Archived,
    AttachmentsDownloaded,
    SoftDeletedByRecipient,
    RestoredByRecipient,
    PurgedByRecipient,
    PurgedByAltinn,
    Failed,
}

named_enum!(
    CorrespondenceStatus,
    "correspondence status",
    [
        Initialized,
        ReadyForPublish,
        Published,
        Fetched,
        Read,
        Confirmed,
        Archived,
        AttachmentsDownloaded,
        SoftDeletedByRecipient,
        RestoredByRecipient,
        PurgedByRecipient,
        PurgedByAltinn,
        Failed,
    ]
);

impl CorrespondenceStatus {
    /// Terminal purge statuses.
    pub fn is_purged(&self) -> bool {
        matches!(self, Self::PurgedByRecipient | Self::PurgedByAltinn)
    }

    /// Statuses that arrive through delete events rather than status events.
    pub fn is_delete_family(&self) -> bool {
        matches!(
            self,
            Self::SoftDeletedByRecipient
                | Self::RestoredByRecipient
                | Self::PurgedByRecipient
                | Self::PurgedByAltinn
        )
    }

    /// Bookkeeping statuses that never surface as the recipient-visible status.
    pub fn is_bookkeeping(&self) -> bool {
        matches!(self, Self::Fetched | Self::AttachmentsDownloaded)
    }

    /// Statuses that only the sending side produces before publication.
    pub fn is_pre_publication(&self) -> bool {
        matches!(self, Self::Initialized | Self::ReadyForPublish | Self::Failed)
    }
}
