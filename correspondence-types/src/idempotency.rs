//! Idempotency keys for mirrored external effects.

use crate::ids::{AttachmentId, CorrespondenceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The logical action a key stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdempotentAction {
    Fetched,
    Confirmed,
    AttachmentDownloaded,
    Purged,
}

named_enum!(
    IdempotentAction,
    "idempotent action",
    [Fetched, Confirmed, AttachmentDownloaded, Purged]
);

/// The kind of external side effect the key is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    DialogActivity,
}

named_enum!(EffectKind, "effect kind", [DialogActivity]);

/// The uniqueness tuple of an idempotency key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyScope {
    pub correspondence_id: CorrespondenceId,
    pub attachment_id: Option<AttachmentId>,
    pub action: IdempotentAction,
    pub effect_kind: EffectKind,
}

impl KeyScope {
    /// Scope of a dialog activity not tied to an attachment.
    pub fn activity(correspondence_id: CorrespondenceId, action: IdempotentAction) -> Self {
        Self {
            correspondence_id,
            attachment_id: None,
            action,
            effect_kind: EffectKind::DialogActivity,
        }
    }

    /// Scope of the download activity for one attachment.
    pub fn attachment_download(
        correspondence_id: CorrespondenceId,
        attachment_id: AttachmentId,
    ) -> Self {
        Self {
            correspondence_id,
            attachment_id: Some(attachment_id),
            action: IdempotentAction::AttachmentDownloaded,
            effect_kind: EffectKind::DialogActivity,
        }
    }
}

/// A stable identifier minted once per scope and reused as the external
/// operation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotencyKey {
    pub id: Uuid,
    pub scope: KeyScope,
    pub created_at: DateTime<Utc>,
}

impl IdempotencyKey {
    pub fn mint(scope: KeyScope) -> Self {
        Self {
            id: Uuid::now_v7(),
            scope,
            created_at: Utc::now(),
        }
    }
}
