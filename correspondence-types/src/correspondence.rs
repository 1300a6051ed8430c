//! The correspondence aggregate.

use crate::ids::{AttachmentId, CorrespondenceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of an external reference attached to a correspondence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceType {
    Generic,
    AltinnAppInstance,
    AltinnBrokerFileTransfer,
    DialogportenDialogId,
    DialogportenProcessId,
    DialogportenTransmissionId,
}

named_enum!(
    ReferenceType,
    "reference type",
    [
        Generic,
        AltinnAppInstance,
        AltinnBrokerFileTransfer,
        DialogportenDialogId,
        DialogportenProcessId,
        DialogportenTransmissionId,
    ]
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalReference {
    pub reference_type: ReferenceType,
    pub value: String,
}

impl ExternalReference {
    pub fn new(reference_type: ReferenceType, value: impl Into<String>) -> Self {
        Self {
            reference_type,
            value: value.into(),
        }
    }
}

/// Localised message content shown in the dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub language: String,
    pub title: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub file_name: String,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            id: AttachmentId::new(),
            file_name: file_name.into(),
        }
    }
}

/// A single digital message tracked through its status lifecycle.
///
/// The aggregate itself is immutable once stored except for its external
/// references, which grow as mirrors hand back their identifiers. Status lives
/// in the append-only history, never on this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correspondence {
    pub id: CorrespondenceId,
    pub resource_id: String,
    /// Sender URN, e.g. `urn:altinn:organization:identifier-no:991825827`.
    pub sender: String,
    /// Recipient URN.
    pub recipient: String,
    pub senders_reference: String,
    /// Display name overriding the sender in recipient-facing surfaces.
    pub message_sender: Option<String>,
    pub content: Content,
    pub attachments: Vec<Attachment>,
    pub is_confirmation_needed: bool,
    /// Imported from the legacy system and not yet visible; mirror calls are suppressed.
    pub is_migrating: bool,
    pub external_references: Vec<ExternalReference>,
    pub created_at: DateTime<Utc>,
}

impl Correspondence {
    pub fn new(
        resource_id: impl Into<String>,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        senders_reference: impl Into<String>,
        content: Content,
    ) -> Self {
        Self {
            id: CorrespondenceId::new(),
            resource_id: resource_id.into(),
            sender: sender.into(),
            recipient: recipient.into(),
            senders_reference: senders_reference.into(),
            message_sender: None,
            content,
            attachments: Vec::new(),
            is_confirmation_needed: false,
            is_migrating: false,
            external_references: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_message_sender(mut self, message_sender: impl Into<String>) -> Self {
        self.message_sender = Some(message_sender.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_external_reference(mut self, reference: ExternalReference) -> Self {
        self.external_references.push(reference);
        self
    }

    pub fn requiring_confirmation(mut self) -> Self {
        self.is_confirmation_needed = true;
        self
    }

    pub fn migrating(mut self) -> Self {
        self.is_migrating = true;
        self
    }

    /// First reference value of the given type.
    pub fn external_reference(&self, reference_type: ReferenceType) -> Option<&str> {
        self.external_references
            .iter()
            .find(|r| r.reference_type == reference_type)
            .map(|r| r.value.as_str())
    }

    /// Identifier of the mirrored dialog, once one has been created.
    pub fn dialog_id(&self) -> Option<&str> {
        self.external_reference(ReferenceType::DialogportenDialogId)
    }

    pub fn attachment(&self, id: &AttachmentId) -> Option<&Attachment> {
        self.attachments.iter().find(|a| &a.id == id)
    }
}
