//! Wire types exchanged with the dialog system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A text value in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedValue {
    pub language_code: String,
    pub value: String,
}

impl LocalizedValue {
    pub fn new(language_code: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            language_code: language_code.into(),
            value: value.into(),
        }
    }
}

/// A content block with its media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentValue {
    pub media_type: String,
    pub value: Vec<LocalizedValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogContent {
    pub title: ContentValue,
    pub summary: ContentValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<ContentValue>,
    pub main_content_reference: ContentValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTag {
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiActionEndpoint {
    pub url: String,
    pub http_method: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiAction {
    pub action: String,
    pub endpoints: Vec<ApiActionEndpoint>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuiActionPriority {
    Primary,
    Secondary,
    #[default]
    Tertiary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuiAction {
    pub action: String,
    pub url: String,
    pub priority: GuiActionPriority,
    pub http_method: String,
    pub is_delete_dialog_action: bool,
    pub title: Vec<LocalizedValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentUrl {
    pub consumer_type: String,
    pub media_type: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogAttachment {
    pub display_name: Vec<LocalizedValue>,
    pub urls: Vec<AttachmentUrl>,
}

/// Payload for `POST /dialogs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDialogRequest {
    pub id: String,
    pub service_resource: String,
    pub party: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process: Option<String>,
    pub status: String,
    pub external_reference: String,
    pub system_label: SystemLabel,
    pub content: DialogContent,
    pub search_tags: Vec<SearchTag>,
    pub api_actions: Vec<ApiAction>,
    pub gui_actions: Vec<GuiAction>,
    pub attachments: Vec<DialogAttachment>,
}

/// Activity kinds understood by the dialog system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityType {
    Information,
    CorrespondenceOpened,
    CorrespondenceConfirmed,
    DialogDeleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformedBy {
    pub actor_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
}

/// Payload for `POST /dialogs/{id}/activities`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityRequest {
    /// External operation id; an idempotency key when one exists.
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub performed_by: PerformedBy,
    pub description: Vec<LocalizedValue>,
}

/// The subset of a fetched dialog the coordinator inspects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Dialog {
    pub id: String,
    pub status: String,
    pub gui_actions: Vec<GuiAction>,
    pub api_actions: Vec<ApiAction>,
}

/// One JSON-patch operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// End-user system labels on a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemLabel {
    Default,
    Bin,
    Archive,
}

/// Payload for `PUT /dialogs/{id}/endusercontext/systemlabels`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSystemLabelsRequest {
    pub dialog_id: String,
    pub add_labels: Vec<SystemLabel>,
    pub remove_labels: Vec<SystemLabel>,
    pub performed_by: PerformedBy,
}
