//! In-memory [`DialogService`] that records every call.
//!
//! Activity ids behave like the real dialog system: posting an id twice
//! succeeds once and is absorbed afterwards.

use crate::client::DialogService;
use crate::error::{DialogError, DialogResult};
use crate::types::*;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// One call received by [`RecordingDialogService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogCall {
    CreateDialog(CreateDialogRequest),
    CreateActivity {
        dialog_id: String,
        request: CreateActivityRequest,
    },
    GetDialog(String),
    PatchDialog {
        dialog_id: String,
        operations: Vec<PatchOperation>,
    },
    PurgeDialog(String),
    SoftDeleteDialog(String),
    SetSystemLabels(SetSystemLabelsRequest),
}

#[derive(Default)]
struct State {
    calls: Vec<DialogCall>,
    dialogs: HashMap<String, Dialog>,
    activity_ids: HashSet<String>,
    fail_next: Option<u16>,
}

#[derive(Default)]
pub struct RecordingDialogService {
    state: Mutex<State>,
}

impl RecordingDialogService {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes the next call fail with `status`.
    pub fn fail_next(&self, status: u16) {
        self.lock().fail_next = Some(status);
    }

    /// Replaces the stored dialog returned by `get_dialog`.
    pub fn put_dialog(&self, dialog: Dialog) {
        self.lock().dialogs.insert(dialog.id.clone(), dialog);
    }

    pub fn calls(&self) -> Vec<DialogCall> {
        self.lock().calls.clone()
    }

    pub fn created_dialogs(&self) -> Vec<CreateDialogRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DialogCall::CreateDialog(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    /// Every activity posted, including absorbed repeats.
    pub fn activities(&self) -> Vec<CreateActivityRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DialogCall::CreateActivity { request, .. } => Some(request),
                _ => None,
            })
            .collect()
    }

    /// Number of distinct activities the dialog system holds.
    pub fn stored_activity_count(&self) -> usize {
        self.lock().activity_ids.len()
    }

    pub fn patches(&self) -> Vec<Vec<PatchOperation>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DialogCall::PatchDialog { operations, .. } => Some(operations),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: DialogCall) -> DialogResult<MutexGuard<'_, State>> {
        let mut state = self.lock();
        state.calls.push(call);
        if let Some(status) = state.fail_next.take() {
            return Err(DialogError::ExternalSystem {
                status,
                body: "injected failure".to_string(),
            });
        }
        Ok(state)
    }
}

#[async_trait]
impl DialogService for RecordingDialogService {
    async fn create_dialog(&self, request: &CreateDialogRequest) -> DialogResult<String> {
        let mut state = self.record(DialogCall::CreateDialog(request.clone()))?;
        state.dialogs.insert(
            request.id.clone(),
            Dialog {
                id: request.id.clone(),
                status: request.status.clone(),
                gui_actions: request.gui_actions.clone(),
                api_actions: request.api_actions.clone(),
            },
        );
        Ok(request.id.clone())
    }

    async fn create_activity(
        &self,
        dialog_id: &str,
        request: &CreateActivityRequest,
    ) -> DialogResult<()> {
        let mut state = self.record(DialogCall::CreateActivity {
            dialog_id: dialog_id.to_string(),
            request: request.clone(),
        })?;
        state.activity_ids.insert(request.id.clone());
        Ok(())
    }

    async fn get_dialog(&self, dialog_id: &str) -> DialogResult<Dialog> {
        let state = self.record(DialogCall::GetDialog(dialog_id.to_string()))?;
        state
            .dialogs
            .get(dialog_id)
            .cloned()
            .ok_or_else(|| DialogError::NotFound(format!("dialog {dialog_id}")))
    }

    async fn patch_dialog(&self, dialog_id: &str, operations: &[PatchOperation]) -> DialogResult<()> {
        self.record(DialogCall::PatchDialog {
            dialog_id: dialog_id.to_string(),
            operations: operations.to_vec(),
        })?;
        Ok(())
    }

    async fn purge_dialog(&self, dialog_id: &str) -> DialogResult<()> {
        let mut state = self.record(DialogCall::PurgeDialog(dialog_id.to_string()))?;
        state.dialogs.remove(dialog_id);
        Ok(())
    }

    async fn soft_delete_dialog(&self, dialog_id: &str) -> DialogResult<()> {
        self.record(DialogCall::SoftDeleteDialog(dialog_id.to_string()))?;
        Ok(())
    }

    async fn set_system_labels(&self, request: &SetSystemLabelsRequest) -> DialogResult<()> {
        self.record(DialogCall::SetSystemLabels(request.clone()))?;
        Ok(())
    }
}
