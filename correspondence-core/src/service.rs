//! The correspondence lifecycle service.

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use correspondence_dialog::{
    ActorType, DialogApiClient, DialogConfig, DialogLifecycleCoordinator, DialogService,
    SystemLabel, TextType,
};
use correspondence_ledger::{InsertOutcome, LedgerError, StatusLedger, SyncDeduplicator, SyncReport};
use correspondence_storage::CorrespondenceStore;
use correspondence_types::{
    AttachmentId, Correspondence, CorrespondenceId, CorrespondenceStatus, DeleteEvent,
    ForwardingDestination, ForwardingEvent, NotificationChannel,
    NotificationEvent, PartyId, StatusEvent, SyncBatch,
};
use serde::Serialize;
use tracing::{debug, info};

/// What a recipient sees when opening a correspondence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrespondenceOverview {
    pub correspondence: Correspondence,
    /// Recipient-visible status after this retrieval was recorded.
    pub status: CorrespondenceStatus,
    pub first_retrieval: bool,
}

pub struct CorrespondenceService<S> {
    store: CorrespondenceStore,
    ledger: StatusLedger,
    sync: SyncDeduplicator,
    coordinator: DialogLifecycleCoordinator<S>,
}

impl CorrespondenceService<DialogApiClient> {
    /// Opens the configured store and connects to the dialog system over HTTP.
    pub fn from_config(config: &CoreConfig) -> CoreResult<Self> {
        config.validate()?;
        let store = config.open_store()?;
        let client = DialogApiClient::new(config.dialog.clone())?;
        Ok(Self::new(store, client, &config.dialog))
    }
}

impl<S: DialogService> CorrespondenceService<S> {
    pub fn new(store: CorrespondenceStore, service: S, dialog_config: &DialogConfig) -> Self {
        Self {
            ledger: StatusLedger::new(store.clone()),
            sync: SyncDeduplicator::new(store.clone()),
            coordinator: DialogLifecycleCoordinator::new(service, store.clone(), dialog_config),
            store,
        }
    }

    pub fn store(&self) -> &CorrespondenceStore {
        &self.store
    }

    pub fn ledger(&self) -> &StatusLedger {
        &self.ledger
    }

    pub fn coordinator(&self) -> &DialogLifecycleCoordinator<S> {
        &self.coordinator
    }

    // ── Sender side ──

    /// Stores a new correspondence, records `Initialized`, and creates its
    /// dialog unless it is still migrating.
    pub async fn initialize_correspondence(
        &self,
        correspondence: Correspondence,
    ) -> CoreResult<CorrespondenceId> {
        validate_new(&correspondence)?;
        let id = correspondence.id;

        if !self.store.insert_correspondence(&correspondence)?.is_created() {
            return Err(CoreError::Validation(format!("correspondence {id} already exists")));
        }
        self.ledger.append_status(StatusEvent::new(
            id,
            CorrespondenceStatus::Initialized,
            correspondence.created_at,
        ))?;
        info!(correspondence_id = %id, migrating = correspondence.is_migrating, "correspondence initialized");

        if !correspondence.is_migrating {
            self.coordinator.create_dialog(&id).await?;
        }
        Ok(id)
    }

    /// Moves an initialized correspondence through `ReadyForPublish` to
    /// `Published` and posts the published activity.
    pub async fn publish(&self, id: &CorrespondenceId, at: DateTime<Utc>) -> CoreResult<()> {
        if self.ledger.current_status(id)? == CorrespondenceStatus::Initialized {
            self.ledger
                .append_status(StatusEvent::new(*id, CorrespondenceStatus::ReadyForPublish, at))?;
        }
        self.ledger
            .append_status(StatusEvent::new(*id, CorrespondenceStatus::Published, at))?;
        info!(correspondence_id = %id, "correspondence published");

        self.coordinator
            .record_activity(id, ActorType::ServiceOwner, TextType::CorrespondencePublished, &[], at)
            .await?;
        Ok(())
    }

    // ── Recipient side ──

    /// Records a retrieval and returns the overview. The first retrieval
    /// also posts the opened activity.
    pub async fn retrieve_overview(
        &self,
        id: &CorrespondenceId,
        recipient: PartyId,
        at: DateTime<Utc>,
    ) -> CoreResult<CorrespondenceOverview> {
        let correspondence = self.ledger.correspondence(id)?;
        let retrieval = self.ledger.record_retrieval(id, recipient, at)?;
        if retrieval.first_retrieval && retrieval.outcome.is_created() {
            self.coordinator.record_opened(id, at).await?;
        }
        Ok(CorrespondenceOverview {
            correspondence,
            status: retrieval.visible_status,
            first_retrieval: retrieval.first_retrieval,
        })
    }

    /// Applies an interactive status change and mirrors it.
    ///
    /// Reads go through [`Self::retrieve_overview`] and downloads through
    /// [`Self::record_attachment_download`]; the publication sequence goes
    /// through [`Self::publish`].
    pub async fn update_status(
        &self,
        id: &CorrespondenceId,
        status: CorrespondenceStatus,
        actor_party: Option<PartyId>,
        at: DateTime<Utc>,
    ) -> CoreResult<InsertOutcome> {
        use CorrespondenceStatus::*;

        if !matches!(
            status,
            Confirmed
                | Archived
                | SoftDeletedByRecipient
                | RestoredByRecipient
                | PurgedByRecipient
                | PurgedByAltinn
                | Failed
        ) {
            return Err(CoreError::Validation(format!(
                "status {status} cannot be set directly"
            )));
        }

        let mut event = StatusEvent::new(*id, status, at);
        event.actor_party = actor_party;
        let outcome = self.ledger.append_status(event)?;
        if outcome.is_created() {
            self.mirror_status(id, status, at).await?;
        } else {
            debug!(correspondence_id = %id, %status, "duplicate status, nothing mirrored");
        }
        Ok(outcome)
    }

    /// Records that the recipient downloaded one attachment.
    pub async fn record_attachment_download(
        &self,
        id: &CorrespondenceId,
        attachment_id: &AttachmentId,
        recipient: PartyId,
        at: DateTime<Utc>,
    ) -> CoreResult<InsertOutcome> {
        let correspondence = self.ledger.correspondence(id)?;
        if correspondence.attachment(attachment_id).is_none() {
            return Err(LedgerError::NotFound(format!(
                "attachment {attachment_id} on correspondence {id}"
            ))
            .into());
        }

        let outcome = self.ledger.append_status(
            StatusEvent::new(*id, CorrespondenceStatus::AttachmentsDownloaded, at)
                .by(recipient)
                .for_attachment(*attachment_id),
        )?;
        if outcome.is_created() {
            self.coordinator
                .record_download_started(id, attachment_id, at)
                .await?;
        }
        Ok(outcome)
    }

    // ── Sync import ──

    /// Imports historical status events. Created Read/Confirmed/Archived
    /// events are mirrored.
    pub async fn sync_status_events(&self, batch: &SyncBatch<StatusEvent>) -> CoreResult<SyncReport> {
        let mirror = self.mirrors(&batch.correspondence_id)?;
        let report = self.sync.sync_status_events(batch)?;
        if mirror {
            for i in report.created_indices() {
                let event = &batch.events[i];
                self.mirror_status(&batch.correspondence_id, event.status, event.occurred_at)
                    .await?;
            }
        }
        Ok(report)
    }

    /// Imports notification events. Created events become notification-sent
    /// activities.
    pub async fn sync_notification_events(
        &self,
        batch: &SyncBatch<NotificationEvent>,
    ) -> CoreResult<SyncReport> {
        let mirror = self.mirrors(&batch.correspondence_id)?;
        let report = self.sync.sync_notification_events(batch)?;
        if mirror {
            for i in report.created_indices() {
                let event = &batch.events[i];
                let text_type = if event.is_reminder {
                    TextType::NotificationReminderSent
                } else {
                    TextType::NotificationSent
                };
                let channel = match event.channel {
                    NotificationChannel::Email => "Email",
                    NotificationChannel::Sms => "Sms",
                };
                self.coordinator
                    .record_activity(
                        &batch.correspondence_id,
                        ActorType::ServiceOwner,
                        text_type,
                        &[event.address.as_str(), channel],
                        event.sent_at,
                    )
                    .await?;
            }
        }
        Ok(report)
    }

    /// Imports forwarding events. Created events become forwarding
    /// activities performed by the recipient.
    pub async fn sync_forwarding_events(
        &self,
        batch: &SyncBatch<ForwardingEvent>,
    ) -> CoreResult<SyncReport> {
        let mirror = self.mirrors(&batch.correspondence_id)?;
        let report = self.sync.sync_forwarding_events(batch)?;
        if mirror {
            for i in report.created_indices() {
                let event = &batch.events[i];
                let (text_type, target) = match &event.destination {
                    ForwardingDestination::Email(address) => (TextType::ForwardedToEmail, address),
                    ForwardingDestination::MailboxSupplier(supplier) => {
                        (TextType::ForwardedToMailboxSupplier, supplier)
                    }
                    ForwardingDestination::User(user) => (TextType::ForwardedToUser, user),
                };
                let forwarded_by = event
                    .forwarded_by_user
                    .clone()
                    .unwrap_or_else(|| event.forwarded_by_party.to_string());
                let note = event.note.as_deref().unwrap_or_default();
                self.coordinator
                    .record_activity(
                        &batch.correspondence_id,
                        ActorType::Recipient,
                        text_type,
                        &[forwarded_by.as_str(), target.as_str(), note],
                        event.forwarded_at,
                    )
                    .await?;
            }
        }
        Ok(report)
    }

    /// Imports delete events. Created events are mirrored like the matching
    /// interactive status change, up to and including the first purge.
    pub async fn sync_delete_events(&self, batch: &SyncBatch<DeleteEvent>) -> CoreResult<SyncReport> {
        let mirror = self.mirrors(&batch.correspondence_id)?;
        let report = self.sync.sync_delete_events(batch)?;
        if mirror {
            for i in report.created_indices() {
                let event = &batch.events[i];
                self.mirror_status(&batch.correspondence_id, event.event_type.status(), event.occurred_at)
                    .await?;
                if event.event_type.is_purge() {
                    break;
                }
            }
        }
        Ok(report)
    }

    // ── Mirroring ──

    /// Whether synced events for `id` reach the dialog system. Migrating
    /// correspondences have no dialog and purged ones accept no further
    /// visible changes. Evaluated before the batch is written.
    fn mirrors(&self, id: &CorrespondenceId) -> CoreResult<bool> {
        let Some(correspondence) = self.store.get_correspondence(id)? else {
            return Ok(false);
        };
        if correspondence.is_migrating {
            return Ok(false);
        }
        if self.store.is_purged(id)? {
            debug!(correspondence_id = %id, "purged correspondence, synced events not mirrored");
            return Ok(false);
        }
        Ok(true)
    }

    async fn mirror_status(
        &self,
        id: &CorrespondenceId,
        status: CorrespondenceStatus,
        at: DateTime<Utc>,
    ) -> CoreResult<()> {
        use CorrespondenceStatus::*;

        match status {
            Read => {
                self.coordinator.record_opened(id, at).await?;
            }
            Confirmed => {
                self.coordinator.record_confirmed(id, at).await?;
                self.coordinator.patch_confirm_actions(id).await?;
            }
            Archived => {
                self.coordinator.set_dialog_label(id, SystemLabel::Archive).await?;
            }
            SoftDeletedByRecipient => {
                self.coordinator.set_dialog_label(id, SystemLabel::Bin).await?;
            }
            RestoredByRecipient => {
                self.coordinator.clear_dialog_label(id, SystemLabel::Bin).await?;
            }
            PurgedByRecipient | PurgedByAltinn => {
                let actor = if status == PurgedByAltinn {
                    ActorType::Sender
                } else {
                    ActorType::Recipient
                };
                if self.coordinator.record_purged(id, actor, at).await? {
                    let correspondence = self.ledger.correspondence(id)?;
                    if let Some(dialog_id) = correspondence.dialog_id() {
                        self.coordinator.soft_delete_dialog(dialog_id).await?;
                    }
                }
            }
            Initialized | ReadyForPublish | Published | Fetched | AttachmentsDownloaded | Failed => {}
        }
        Ok(())
    }
}

fn validate_new(correspondence: &Correspondence) -> CoreResult<()> {
    for (field, value) in [
        ("resource_id", &correspondence.resource_id),
        ("sender", &correspondence.sender),
        ("recipient", &correspondence.recipient),
        ("content.language", &correspondence.content.language),
    ] {
        if value.trim().is_empty() {
            return Err(CoreError::Validation(format!("{field} must not be empty")));
        }
    }
    if correspondence.attachments.iter().any(|a| a.file_name.trim().is_empty()) {
        return Err(CoreError::Validation("attachment file name must not be empty".to_string()));
    }
    Ok(())
}
