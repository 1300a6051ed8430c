//! JSON-patch documents for dialog updates.

use crate::types::{Dialog, PatchOperation};
use serde_json::Value;

const REQUIRES_ATTENTION: &str = "RequiresAttention";
const NOT_APPLICABLE: &str = "NotApplicable";

#[derive(Debug, Default)]
pub struct DialogPatchBuilder {
    operations: Vec<PatchOperation>,
}

impl DialogPatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove_gui_action(mut self, index: usize) -> Self {
        self.operations.push(remove(format!("/guiActions/{index}")));
        self
    }

    pub fn remove_api_action(mut self, index: usize) -> Self {
        self.operations.push(remove(format!("/apiActions/{index}")));
        self
    }

    pub fn replace_status(mut self, status: &str) -> Self {
        self.operations.push(PatchOperation {
            op: "replace".to_string(),
            path: "/status".to_string(),
            value: Some(Value::String(status.to_string())),
        });
        self
    }

    pub fn build(self) -> Vec<PatchOperation> {
        self.operations
    }
}

fn remove(path: String) -> PatchOperation {
    PatchOperation {
        op: "remove".to_string(),
        path,
        value: None,
    }
}

/// Operations that drop the confirm action from `dialog`.
///
/// Actions are matched on the exact confirm URL. A dialog awaiting attention
/// is moved to `NotApplicable`. Returns an empty list when nothing matches.
pub fn confirm_actions_patch(dialog: &Dialog, confirm_url: &str) -> Vec<PatchOperation> {
    let mut builder = DialogPatchBuilder::new();
    if let Some(index) = dialog.gui_actions.iter().position(|a| a.url == confirm_url) {
        builder = builder.remove_gui_action(index);
    }
    if let Some(index) = dialog
        .api_actions
        .iter()
        .position(|a| a.endpoints.iter().any(|e| e.url == confirm_url))
    {
        builder = builder.remove_api_action(index);
    }
    if dialog.status == REQUIRES_ATTENTION {
        builder = builder.replace_status(NOT_APPLICABLE);
    }
    builder.build()
}
