//! Append-only lifecycle events and the sync batch envelope.

use crate::ids::{AttachmentId, CorrespondenceId, PartyId};
use crate::status::CorrespondenceStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Status ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub correspondence_id: CorrespondenceId,
    pub status: CorrespondenceStatus,
    pub occurred_at: DateTime<Utc>,
    pub actor_party: Option<PartyId>,
    pub note: Option<String>,
    /// Set only for `AttachmentsDownloaded`.
    pub attachment_id: Option<AttachmentId>,
}

impl StatusEvent {
    pub fn new(
        correspondence_id: CorrespondenceId,
        status: CorrespondenceStatus,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            correspondence_id,
            status,
            occurred_at,
            actor_party: None,
            note: None,
            attachment_id: None,
        }
    }

    pub fn by(mut self, party: PartyId) -> Self {
        self.actor_party = Some(party);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn for_attachment(mut self, attachment_id: AttachmentId) -> Self {
        self.attachment_id = Some(attachment_id);
        self
    }
}

// ── Notification ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationChannel {
    Email,
    Sms,
}

named_enum!(NotificationChannel, "notification channel", [Email, Sms]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub correspondence_id: CorrespondenceId,
    pub channel: NotificationChannel,
    pub address: String,
    pub sent_at: DateTime<Utc>,
    pub is_reminder: bool,
    /// Notification id in the source system. Informational only.
    pub source_notification_id: Option<i64>,
}

// ── Forwarding ──

/// Where a forwarded correspondence was sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ForwardingDestination {
    Email(String),
    MailboxSupplier(String),
    User(String),
}

impl ForwardingDestination {
    pub fn describe(&self) -> &str {
        match self {
            Self::Email(v) | Self::MailboxSupplier(v) | Self::User(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardingEvent {
    pub correspondence_id: CorrespondenceId,
    pub forwarded_at: DateTime<Utc>,
    pub forwarded_by_party: PartyId,
    pub forwarded_by_user: Option<String>,
    pub destination: ForwardingDestination,
    pub note: Option<String>,
}

// ── Delete ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeleteEventType {
    SoftDeletedByRecipient,
    RestoredByRecipient,
    PurgedByRecipient,
    PurgedByAltinn,
}

named_enum!(
    DeleteEventType,
    "delete event type",
    [
        SoftDeletedByRecipient,
        RestoredByRecipient,
        PurgedByRecipient,
        PurgedByAltinn,
    ]
);

impl DeleteEventType {
    pub fn is_purge(&self) -> bool {
        matches!(self, Self::PurgedByRecipient | Self::PurgedByAltinn)
    }

    /// The status appended to the history alongside this delete event.
    pub fn status(&self) -> CorrespondenceStatus {
        match self {
            Self::SoftDeletedByRecipient => CorrespondenceStatus::SoftDeletedByRecipient,
            Self::RestoredByRecipient => CorrespondenceStatus::RestoredByRecipient,
            Self::PurgedByRecipient => CorrespondenceStatus::PurgedByRecipient,
            Self::PurgedByAltinn => CorrespondenceStatus::PurgedByAltinn,
        }
    }

    pub fn from_status(status: CorrespondenceStatus) -> Option<Self> {
        match status {
            CorrespondenceStatus::SoftDeletedByRecipient => Some(Self::SoftDeletedByRecipient),
            CorrespondenceStatus::RestoredByRecipient => Some(Self::RestoredByRecipient),
            CorrespondenceStatus::PurgedByRecipient => Some(Self::PurgedByRecipient),
            CorrespondenceStatus::PurgedByAltinn => Some(Self::PurgedByAltinn),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteEvent {
    pub correspondence_id: CorrespondenceId,
    pub event_type: DeleteEventType,
    pub occurred_at: DateTime<Utc>,
    pub actor_party: Option<PartyId>,
}

// ── Sync envelope ──

/// A batch of externally-sourced events for one correspondence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncBatch<E> {
    pub correspondence_id: CorrespondenceId,
    pub events: Vec<E>,
}

impl<E> SyncBatch<E> {
    pub fn new(correspondence_id: CorrespondenceId, events: Vec<E>) -> Self {
        Self {
            correspondence_id,
            events,
        }
    }
}
