//! HTTP client for the dialog system's service-owner API.
//!
//! [`DialogService`] is the narrow seam the coordinator talks to;
//! [`DialogApiClient`] implements it over reqwest with bearer authentication.
//! Non-success responses surface as [`DialogError::ExternalSystem`] except for
//! the few statuses the dialog system uses to report an already-applied
//! operation.

use crate::config::DialogConfig;
use crate::error::{DialogError, DialogResult};
use crate::types::*;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

const DIALOGS_PATH: &str = "dialogporten/api/v1/serviceowner/dialogs";

/// Operations the lifecycle coordinator needs from the dialog system.
#[async_trait]
pub trait DialogService: Send + Sync {
    /// Creates a dialog and returns its id.
    async fn create_dialog(&self, request: &CreateDialogRequest) -> DialogResult<String>;

    /// Appends an activity. An activity whose id already exists is success.
    async fn create_activity(
        &self,
        dialog_id: &str,
        request: &CreateActivityRequest,
    ) -> DialogResult<()>;

    async fn get_dialog(&self, dialog_id: &str) -> DialogResult<Dialog>;

    async fn patch_dialog(&self, dialog_id: &str, operations: &[PatchOperation]) -> DialogResult<()>;

    /// Hard-deletes a dialog.
    async fn purge_dialog(&self, dialog_id: &str) -> DialogResult<()>;

    /// Soft-deletes a dialog.
    async fn soft_delete_dialog(&self, dialog_id: &str) -> DialogResult<()>;

    /// Updates end-user system labels. A dialog that is already gone is success.
    async fn set_system_labels(&self, request: &SetSystemLabelsRequest) -> DialogResult<()>;
}

/// reqwest-backed [`DialogService`].
#[derive(Clone)]
pub struct DialogApiClient {
    client: Client,
    config: DialogConfig,
}

impl DialogApiClient {
    pub fn new(config: DialogConfig) -> DialogResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DialogConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{DIALOGS_PATH}{path}", self.config.dialog_base());
        let builder = self.client.request(method, url);
        match &self.config.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

/// Turns a non-success response into [`DialogError::ExternalSystem`].
async fn ensure_success(resp: Response) -> DialogResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(DialogError::ExternalSystem {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl DialogService for DialogApiClient {
    // ── Dialogs ──

    async fn create_dialog(&self, request: &CreateDialogRequest) -> DialogResult<String> {
        let resp = self.request(Method::POST, "").json(request).send().await?;
        let body = ensure_success(resp).await?.text().await?;
        let dialog_id = body.trim().trim_matches('"').to_string();
        if dialog_id.is_empty() {
            return Err(DialogError::ExternalSystem {
                status: 200,
                body: "dialog created without an id".to_string(),
            });
        }
        debug!(%dialog_id, "dialog created");
        Ok(dialog_id)
    }

    async fn get_dialog(&self, dialog_id: &str) -> DialogResult<Dialog> {
        let resp = self
            .request(Method::GET, &format!("/{dialog_id}"))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(DialogError::NotFound(format!("dialog {dialog_id}")));
        }
        Ok(ensure_success(resp).await?.json().await?)
    }

    async fn patch_dialog(&self, dialog_id: &str, operations: &[PatchOperation]) -> DialogResult<()> {
        let resp = self
            .request(Method::PATCH, &format!("/{dialog_id}?isSilentUpdate=true"))
            .json(operations)
            .send()
            .await?;
        ensure_success(resp).await?;
        debug!(%dialog_id, operations = operations.len(), "dialog patched");
        Ok(())
    }

    async fn purge_dialog(&self, dialog_id: &str) -> DialogResult<()> {
        let resp = self
            .request(Method::POST, &format!("/{dialog_id}/actions/purge"))
            .send()
            .await?;
        ensure_success(resp).await?;
        debug!(%dialog_id, "dialog purged");
        Ok(())
    }

    async fn soft_delete_dialog(&self, dialog_id: &str) -> DialogResult<()> {
        let resp = self
            .request(Method::DELETE, &format!("/{dialog_id}"))
            .send()
            .await?;
        ensure_success(resp).await?;
        debug!(%dialog_id, "dialog soft-deleted");
        Ok(())
    }

    // ── Activities ──

    async fn create_activity(
        &self,
        dialog_id: &str,
        request: &CreateActivityRequest,
    ) -> DialogResult<()> {
        let resp = self
            .request(
                Method::POST,
                &format!("/{dialog_id}/activities?isSilentUpdate=true"),
            )
            .json(request)
            .send()
            .await?;

        if resp.status() == StatusCode::UNPROCESSABLE_ENTITY {
            let body = resp.text().await.unwrap_or_default();
            if body.contains("already exists") {
                debug!(%dialog_id, activity_id = %request.id, "activity already exists");
                return Ok(());
            }
            return Err(DialogError::ExternalSystem {
                status: StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
                body,
            });
        }
        ensure_success(resp).await?;
        debug!(%dialog_id, activity_id = %request.id, activity_type = ?request.activity_type, "activity created");
        Ok(())
    }

    // ── End-user context ──

    async fn set_system_labels(&self, request: &SetSystemLabelsRequest) -> DialogResult<()> {
        let resp = self
            .request(
                Method::PUT,
                &format!("/{}/endusercontext/systemlabels", request.dialog_id),
            )
            .json(request)
            .send()
            .await?;
        if resp.status() == StatusCode::GONE {
            warn!(dialog_id = %request.dialog_id, "dialog already deleted, system labels not updated");
            return Ok(());
        }
        ensure_success(resp).await?;
        Ok(())
    }
}
