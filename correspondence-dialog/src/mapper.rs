//! Builds dialog-system payloads from correspondences.

use crate::config::DialogConfig;
use crate::error::{DialogError, DialogResult};
use crate::text::{self, TextType};
use crate::types::*;
use chrono::{DateTime, Utc};
use correspondence_types::{AttachmentId, Correspondence, CorrespondenceId, ReferenceType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Shorter search tags carry too little signal to index.
pub const MIN_SEARCH_TAG_LEN: usize = 3;
/// Field-length limit of the dialog system.
pub const MAX_SEARCH_TAG_LEN: usize = 63;

const TEXT_PLAIN: &str = "text/plain";
const EMBEDDED_MARKDOWN: &str = "application/vnd.dialogporten.frontchannelembed+json;type=markdown";

/// Who performed a mirrored activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorType {
    ServiceOwner,
    Sender,
    Recipient,
}

// ── Callback URLs ──

/// Public URLs of this service that the dialog links back to.
#[derive(Debug, Clone)]
pub struct CallbackUrls {
    base: String,
}

impl CallbackUrls {
    pub fn new(config: &DialogConfig) -> Self {
        Self {
            base: config.correspondence_base().to_string(),
        }
    }

    pub fn correspondence(&self, id: &CorrespondenceId) -> String {
        format!("{}/correspondence/api/v1/correspondence/{id}", self.base)
    }

    pub fn content(&self, id: &CorrespondenceId) -> String {
        format!("{}/content", self.correspondence(id))
    }

    pub fn confirm(&self, id: &CorrespondenceId) -> String {
        format!("{}/confirm", self.correspondence(id))
    }

    pub fn purge(&self, id: &CorrespondenceId) -> String {
        format!("{}/purge", self.correspondence(id))
    }

    pub fn attachment_download(&self, id: &CorrespondenceId, attachment_id: &AttachmentId) -> String {
        format!("{}/attachment/{attachment_id}/download", self.correspondence(id))
    }
}

// ── Dialog creation ──

/// Maps a correspondence onto a dialog-creation payload.
pub fn create_dialog_request(
    correspondence: &Correspondence,
    urls: &CallbackUrls,
    is_archived: bool,
) -> CreateDialogRequest {
    let language = correspondence.content.language.as_str();
    let plain = |value: &str| ContentValue {
        media_type: TEXT_PLAIN.to_string(),
        value: vec![LocalizedValue::new(language, value)],
    };

    let sender_name = correspondence
        .message_sender
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(plain);

    CreateDialogRequest {
        id: Uuid::now_v7().to_string(),
        service_resource: format!("urn:altinn:resource:{}", correspondence.resource_id),
        party: correspondence.recipient.clone(),
        process: correspondence
            .external_reference(ReferenceType::DialogportenProcessId)
            .map(str::to_string),
        status: "New".to_string(),
        external_reference: correspondence.senders_reference.clone(),
        system_label: if is_archived {
            SystemLabel::Archive
        } else {
            SystemLabel::Default
        },
        content: DialogContent {
            title: plain(&correspondence.content.title),
            summary: plain(&correspondence.content.summary),
            sender_name,
            main_content_reference: ContentValue {
                media_type: EMBEDDED_MARKDOWN.to_string(),
                value: vec![LocalizedValue::new(language, urls.content(&correspondence.id))],
            },
        },
        search_tags: search_tags(correspondence),
        api_actions: api_actions(correspondence, urls),
        gui_actions: gui_actions(correspondence, urls),
        attachments: correspondence
            .attachments
            .iter()
            .map(|a| DialogAttachment {
                display_name: vec![LocalizedValue::new(language, a.file_name.as_str())],
                urls: vec![AttachmentUrl {
                    consumer_type: "Gui".to_string(),
                    media_type: "application/octet-stream".to_string(),
                    url: urls.attachment_download(&correspondence.id, &a.id),
                }],
            })
            .collect(),
    }
}

/// Search tags from the sender's reference, sender, resource, display sender
/// and every external reference (type and value), in that order.
///
/// Values are trimmed, short values dropped, long values truncated to
/// [`MAX_SEARCH_TAG_LEN`] characters, and duplicates removed after truncation.
pub fn search_tags(correspondence: &Correspondence) -> Vec<SearchTag> {
    let mut candidates: Vec<String> = vec![
        correspondence.senders_reference.clone(),
        correspondence.sender.clone(),
        correspondence.resource_id.clone(),
        correspondence.message_sender.clone().unwrap_or_default(),
    ];
    for reference in &correspondence.external_references {
        candidates.push(reference.reference_type.to_string());
        candidates.push(reference.value.clone());
    }

    let mut seen = HashSet::new();
    candidates
        .iter()
        .filter_map(|raw| normalize_search_tag(raw))
        .filter(|tag| seen.insert(tag.clone()))
        .map(|value| SearchTag { value })
        .collect()
}

fn normalize_search_tag(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < MIN_SEARCH_TAG_LEN {
        return None;
    }
    Some(trimmed.chars().take(MAX_SEARCH_TAG_LEN).collect())
}

fn endpoint(url: String, http_method: &str) -> ApiActionEndpoint {
    ApiActionEndpoint {
        url,
        http_method: http_method.to_string(),
    }
}

fn api_actions(correspondence: &Correspondence, urls: &CallbackUrls) -> Vec<ApiAction> {
    let id = &correspondence.id;
    let mut actions = vec![
        ApiAction {
            action: "read".to_string(),
            endpoints: vec![endpoint(urls.correspondence(id), "GET")],
        },
        ApiAction {
            action: "write".to_string(),
            endpoints: vec![endpoint(urls.purge(id), "DELETE")],
        },
    ];
    if correspondence.is_confirmation_needed {
        actions.push(ApiAction {
            action: "write".to_string(),
            endpoints: vec![endpoint(urls.confirm(id), "POST")],
        });
    }
    actions.extend(correspondence.attachments.iter().map(|a| ApiAction {
        action: "read".to_string(),
        endpoints: vec![endpoint(urls.attachment_download(id, &a.id), "GET")],
    }));
    actions
}

fn titles(nb: &str, nn: &str, en: &str) -> Vec<LocalizedValue> {
    vec![
        LocalizedValue::new("nb", nb),
        LocalizedValue::new("nn", nn),
        LocalizedValue::new("en", en),
    ]
}

fn gui_actions(correspondence: &Correspondence, urls: &CallbackUrls) -> Vec<GuiAction> {
    let id = &correspondence.id;
    let mut actions = Vec::new();
    if correspondence.is_confirmation_needed {
        actions.push(GuiAction {
            action: "read".to_string(),
            url: urls.confirm(id),
            priority: GuiActionPriority::Primary,
            http_method: "POST".to_string(),
            is_delete_dialog_action: false,
            title: titles("Bekreft", "Bekreft", "Confirm"),
        });
    }
    actions.push(GuiAction {
        action: "read".to_string(),
        url: urls.purge(id),
        priority: GuiActionPriority::Tertiary,
        http_method: "DELETE".to_string(),
        is_delete_dialog_action: true,
        title: titles("Slett", "Slett", "Purge"),
    });
    actions
}

// ── Activities ──

/// What to put in an activity besides its type.
#[derive(Debug, Clone, Copy)]
pub struct ActivitySpec<'a> {
    pub activity_type: ActivityType,
    pub actor: ActorType,
    /// Required for `Information` activities, ignored otherwise.
    pub text: Option<(TextType, &'a [&'a str])>,
    pub occurred_at: DateTime<Utc>,
}

/// Maps an activity onto the dialog payload. `key` becomes the activity id;
/// without one a fresh time-ordered id is used.
pub fn create_activity_request(
    correspondence: &Correspondence,
    spec: ActivitySpec<'_>,
    key: Option<Uuid>,
) -> DialogResult<CreateActivityRequest> {
    let (actor_type, actor_id) = match spec.actor {
        ActorType::ServiceOwner => ("ServiceOwner", None),
        ActorType::Sender => ("PartyRepresentative", Some(correspondence.sender.clone())),
        ActorType::Recipient => ("PartyRepresentative", Some(correspondence.recipient.clone())),
    };

    let description = match (spec.activity_type, spec.text) {
        (ActivityType::Information, Some((text_type, tokens))) => text::descriptions(text_type, tokens)?,
        (ActivityType::Information, None) => {
            return Err(DialogError::Validation(
                "information activity requires a text type".to_string(),
            ));
        }
        _ => Vec::new(),
    };

    Ok(CreateActivityRequest {
        id: key.unwrap_or_else(Uuid::now_v7).to_string(),
        created_at: spec.occurred_at,
        activity_type: spec.activity_type,
        performed_by: PerformedBy {
            actor_type: actor_type.to_string(),
            actor_id,
        },
        description,
    })
}
