//! Idempotency key registry.
//!
//! One key per (correspondence, attachment, action, effect kind). The key id is
//! handed to the dialog system as the external operation id, so a replayed
//! call lands on the same external entity.

use crate::error::{LedgerError, LedgerResult};
use correspondence_storage::CorrespondenceStore;
use correspondence_types::{
    AttachmentId, Correspondence, IdempotencyKey, IdempotentAction, KeyScope,
};
use tracing::debug;
use uuid::Uuid;

/// Keys pre-allocated when a dialog is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogKeys {
    pub fetched: Uuid,
    /// Present only when the correspondence requires confirmation.
    pub confirmed: Option<Uuid>,
    pub attachment_downloads: Vec<(AttachmentId, Uuid)>,
}

#[derive(Clone)]
pub struct IdempotencyKeyRegistry {
    store: CorrespondenceStore,
}

impl IdempotencyKeyRegistry {
    pub fn new(store: CorrespondenceStore) -> Self {
        Self { store }
    }

    pub fn lookup(&self, scope: &KeyScope) -> LedgerResult<Option<IdempotencyKey>> {
        Ok(self.store.find_idempotency_key(scope)?)
    }

    /// Returns the key for `scope`, minting it on first use.
    ///
    /// Two concurrent callers may both mint; the store's uniqueness constraint
    /// keeps one and both callers read back that one.
    pub fn get_or_create(&self, scope: &KeyScope) -> LedgerResult<IdempotencyKey> {
        if let Some(existing) = self.store.find_idempotency_key(scope)? {
            return Ok(existing);
        }

        let minted = IdempotencyKey::mint(*scope);
        let outcome = self.store.insert_idempotency_key(&minted)?;
        if outcome.is_created() {
            debug!(
                correspondence_id = %scope.correspondence_id,
                action = %scope.action,
                key = %minted.id,
                "idempotency key minted"
            );
            return Ok(minted);
        }
        self.require(scope)
    }

    /// Allocates the Fetched key, the Confirmed key when confirmation is
    /// needed, and one download key per attachment, in one transaction.
    /// Existing keys are kept.
    pub fn preallocate_for_dialog(&self, correspondence: &Correspondence) -> LedgerResult<DialogKeys> {
        let id = correspondence.id;
        let fetched_scope = KeyScope::activity(id, IdempotentAction::Fetched);
        let confirmed_scope = correspondence
            .is_confirmation_needed
            .then(|| KeyScope::activity(id, IdempotentAction::Confirmed));
        let download_scopes: Vec<(AttachmentId, KeyScope)> = correspondence
            .attachments
            .iter()
            .map(|a| (a.id, KeyScope::attachment_download(id, a.id)))
            .collect();

        let mut keys = vec![IdempotencyKey::mint(fetched_scope)];
        keys.extend(confirmed_scope.map(IdempotencyKey::mint));
        keys.extend(download_scopes.iter().map(|(_, scope)| IdempotencyKey::mint(*scope)));

        let outcomes = self.store.insert_idempotency_keys(&keys)?;
        debug!(
            correspondence_id = %id,
            allocated = outcomes.iter().filter(|o| o.is_created()).count(),
            total = keys.len(),
            "dialog idempotency keys pre-allocated"
        );

        Ok(DialogKeys {
            fetched: self.require(&fetched_scope)?.id,
            confirmed: match confirmed_scope {
                Some(scope) => Some(self.require(&scope)?.id),
                None => None,
            },
            attachment_downloads: download_scopes
                .iter()
                .map(|(attachment_id, scope)| Ok((*attachment_id, self.require(scope)?.id)))
                .collect::<LedgerResult<Vec<_>>>()?,
        })
    }

    fn require(&self, scope: &KeyScope) -> LedgerResult<IdempotencyKey> {
        self.store.find_idempotency_key(scope)?.ok_or_else(|| {
            LedgerError::NotFound(format!(
                "idempotency key for {} {}",
                scope.correspondence_id, scope.action
            ))
        })
    }
}
