//! Drives the dialog system from correspondence lifecycle events.
//!
//! Every typed activity is posted with its idempotency key as the activity id,
//! so a retried or replayed call lands on the activity the dialog system
//! already holds. Correspondences still migrating from the legacy system have
//! no dialog yet; calls for them are skipped and report `false`.

use crate::client::DialogService;
use crate::config::DialogConfig;
use crate::error::{DialogError, DialogResult};
use crate::mapper::{self, ActivitySpec, ActorType, CallbackUrls};
use crate::patch;
use crate::text::TextType;
use crate::types::{ActivityType, PerformedBy, SetSystemLabelsRequest, SystemLabel};
use chrono::{DateTime, Utc};
use correspondence_ledger::{IdempotencyKeyRegistry, StatusLedger};
use correspondence_storage::CorrespondenceStore;
use correspondence_types::{
    AttachmentId, Correspondence, CorrespondenceId, CorrespondenceStatus, ExternalReference,
    IdempotentAction, KeyScope, ReferenceType,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct DialogLifecycleCoordinator<S> {
    service: S,
    ledger: StatusLedger,
    registry: IdempotencyKeyRegistry,
    urls: CallbackUrls,
}

impl<S: DialogService> DialogLifecycleCoordinator<S> {
    pub fn new(service: S, store: CorrespondenceStore, config: &DialogConfig) -> Self {
        Self {
            service,
            ledger: StatusLedger::new(store.clone()),
            registry: IdempotencyKeyRegistry::new(store),
            urls: CallbackUrls::new(config),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn urls(&self) -> &CallbackUrls {
        &self.urls
    }

    /// Loads the correspondence and its dialog id. `None` for a migrating
    /// correspondence without a dialog.
    fn target(
        &self,
        id: &CorrespondenceId,
        operation: &'static str,
    ) -> DialogResult<Option<(Correspondence, String)>> {
        let correspondence = self.ledger.correspondence(id)?;
        match correspondence.dialog_id().map(str::to_string) {
            Some(dialog_id) => Ok(Some((correspondence, dialog_id))),
            None if correspondence.is_migrating => {
                warn!(correspondence_id = %id, operation, "skipped, migrating correspondence has no dialog");
                Ok(None)
            }
            None => Err(DialogError::NotFound(format!("dialog for correspondence {id}"))),
        }
    }

    // ── Dialog ──

    /// Creates the dialog and stores its id as an external reference.
    ///
    /// Idempotency keys are allocated before the call. A correspondence that
    /// already has a dialog returns the stored id without calling out.
    pub async fn create_dialog(&self, id: &CorrespondenceId) -> DialogResult<String> {
        let correspondence = self.ledger.correspondence(id)?;
        if let Some(existing) = correspondence.dialog_id() {
            debug!(correspondence_id = %id, dialog_id = existing, "dialog already exists");
            return Ok(existing.to_string());
        }

        let keys = self.registry.preallocate_for_dialog(&correspondence)?;
        let is_archived = self
            .ledger
            .store()
            .has_status(id, CorrespondenceStatus::Archived)?;
        let request = mapper::create_dialog_request(&correspondence, &self.urls, is_archived);

        let dialog_id = self.service.create_dialog(&request).await?;
        self.ledger.store().add_external_reference(
            id,
            &ExternalReference::new(ReferenceType::DialogportenDialogId, dialog_id.as_str()),
        )?;
        info!(
            correspondence_id = %id,
            %dialog_id,
            search_tags = request.search_tags.len(),
            fetched_key = %keys.fetched,
            "dialog created"
        );
        Ok(dialog_id)
    }

    /// Removes the confirm action from the dialog. Returns whether a patch
    /// was sent; `false` when nothing referenced the confirm URL.
    pub async fn patch_confirm_actions(&self, id: &CorrespondenceId) -> DialogResult<bool> {
        let Some((_, dialog_id)) = self.target(id, "patch_confirm_actions")? else {
            return Ok(false);
        };
        let dialog = self.service.get_dialog(&dialog_id).await?;
        let operations = patch::confirm_actions_patch(&dialog, &self.urls.confirm(id));
        if operations.is_empty() {
            debug!(correspondence_id = %id, %dialog_id, "no confirm actions to remove");
            return Ok(false);
        }
        self.service.patch_dialog(&dialog_id, &operations).await?;
        Ok(true)
    }

    /// Hard-deletes the dialog of a correspondence.
    pub async fn purge_dialog(&self, id: &CorrespondenceId) -> DialogResult<bool> {
        let Some((_, dialog_id)) = self.target(id, "purge_dialog")? else {
            return Ok(false);
        };
        self.service.purge_dialog(&dialog_id).await?;
        info!(correspondence_id = %id, %dialog_id, "dialog purged");
        Ok(true)
    }

    /// Soft-deletes a dialog by its external id.
    pub async fn soft_delete_dialog(&self, dialog_id: &str) -> DialogResult<()> {
        self.service.soft_delete_dialog(dialog_id).await?;
        info!(%dialog_id, "dialog soft-deleted");
        Ok(())
    }

    /// Adds `label` to the dialog on behalf of the recipient.
    pub async fn set_dialog_label(
        &self,
        id: &CorrespondenceId,
        label: SystemLabel,
    ) -> DialogResult<bool> {
        self.update_labels(id, vec![label], Vec::new()).await
    }

    /// Removes `label` from the dialog on behalf of the recipient.
    pub async fn clear_dialog_label(
        &self,
        id: &CorrespondenceId,
        label: SystemLabel,
    ) -> DialogResult<bool> {
        self.update_labels(id, Vec::new(), vec![label]).await
    }

    async fn update_labels(
        &self,
        id: &CorrespondenceId,
        add_labels: Vec<SystemLabel>,
        remove_labels: Vec<SystemLabel>,
    ) -> DialogResult<bool> {
        let Some((correspondence, dialog_id)) = self.target(id, "update_labels")? else {
            return Ok(false);
        };
        let request = SetSystemLabelsRequest {
            dialog_id,
            add_labels,
            remove_labels,
            performed_by: PerformedBy {
                actor_type: "PartyRepresentative".to_string(),
                actor_id: Some(correspondence.recipient),
            },
        };
        self.service.set_system_labels(&request).await?;
        debug!(
            correspondence_id = %id,
            add = ?request.add_labels,
            remove = ?request.remove_labels,
            "dialog labels updated"
        );
        Ok(true)
    }

    // ── Activities ──

    /// Posts an information activity with a three-language description.
    ///
    /// The confirmed text is only posted on the first Confirmed status; a
    /// repeat observation is skipped.
    pub async fn record_activity(
        &self,
        id: &CorrespondenceId,
        actor: ActorType,
        text_type: TextType,
        tokens: &[&str],
        occurred_at: DateTime<Utc>,
    ) -> DialogResult<bool> {
        if text_type == TextType::CorrespondenceConfirmed && self.confirmed_before(id)? {
            debug!(correspondence_id = %id, "confirmed information activity already posted");
            return Ok(false);
        }
        let spec = ActivitySpec {
            activity_type: ActivityType::Information,
            actor,
            text: Some((text_type, tokens)),
            occurred_at,
        };
        self.post_activity(id, spec, None).await
    }

    /// Posts the opened activity under the Fetched key, minting it if needed.
    pub async fn record_opened(
        &self,
        id: &CorrespondenceId,
        occurred_at: DateTime<Utc>,
    ) -> DialogResult<bool> {
        let key = self
            .registry
            .get_or_create(&KeyScope::activity(*id, IdempotentAction::Fetched))?;
        let spec = ActivitySpec {
            activity_type: ActivityType::CorrespondenceOpened,
            actor: ActorType::Recipient,
            text: None,
            occurred_at,
        };
        self.post_activity(id, spec, Some(key.id)).await
    }

    /// Posts the confirmed activity under the Confirmed key, minting it when
    /// it was not pre-allocated. Skipped when Confirmed has been observed
    /// before.
    pub async fn record_confirmed(
        &self,
        id: &CorrespondenceId,
        occurred_at: DateTime<Utc>,
    ) -> DialogResult<bool> {
        if self.confirmed_before(id)? {
            debug!(correspondence_id = %id, "confirmed activity already posted");
            return Ok(false);
        }
        let key = self
            .registry
            .get_or_create(&KeyScope::activity(*id, IdempotentAction::Confirmed))?;
        let spec = ActivitySpec {
            activity_type: ActivityType::CorrespondenceConfirmed,
            actor: ActorType::Recipient,
            text: None,
            occurred_at,
        };
        self.post_activity(id, spec, Some(key.id)).await
    }

    /// Posts the dialog-deleted activity under the Purged key.
    pub async fn record_purged(
        &self,
        id: &CorrespondenceId,
        actor: ActorType,
        occurred_at: DateTime<Utc>,
    ) -> DialogResult<bool> {
        let key = self
            .registry
            .get_or_create(&KeyScope::activity(*id, IdempotentAction::Purged))?;
        let spec = ActivitySpec {
            activity_type: ActivityType::DialogDeleted,
            actor,
            text: None,
            occurred_at,
        };
        self.post_activity(id, spec, Some(key.id)).await
    }

    /// Posts the download-started activity under the attachment's key,
    /// minting it on a miss.
    pub async fn record_download_started(
        &self,
        id: &CorrespondenceId,
        attachment_id: &AttachmentId,
        occurred_at: DateTime<Utc>,
    ) -> DialogResult<bool> {
        let correspondence = self.ledger.correspondence(id)?;
        let attachment = correspondence.attachment(attachment_id).ok_or_else(|| {
            DialogError::NotFound(format!("attachment {attachment_id} on correspondence {id}"))
        })?;
        let key = self
            .registry
            .get_or_create(&KeyScope::attachment_download(*id, *attachment_id))?;
        let tokens = [attachment.file_name.as_str()];
        let spec = ActivitySpec {
            activity_type: ActivityType::Information,
            actor: ActorType::Recipient,
            text: Some((TextType::DownloadStarted, &tokens[..])),
            occurred_at,
        };
        self.post_activity(id, spec, Some(key.id)).await
    }

    /// A second Confirmed row means the first one was already mirrored.
    fn confirmed_before(&self, id: &CorrespondenceId) -> DialogResult<bool> {
        Ok(self
            .ledger
            .store()
            .count_status(id, CorrespondenceStatus::Confirmed)?
            >= 2)
    }

    async fn post_activity(
        &self,
        id: &CorrespondenceId,
        spec: ActivitySpec<'_>,
        key: Option<Uuid>,
    ) -> DialogResult<bool> {
        let Some((correspondence, dialog_id)) = self.target(id, "create_activity")? else {
            return Ok(false);
        };
        let request = mapper::create_activity_request(&correspondence, spec, key)?;
        self.service.create_activity(&dialog_id, &request).await?;
        debug!(
            correspondence_id = %id,
            %dialog_id,
            activity_id = %request.id,
            activity_type = ?request.activity_type,
            "activity recorded"
        );
        Ok(true)
    }
}
