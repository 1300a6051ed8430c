//! Dialog mirror configuration.

use crate::error::{DialogError, DialogResult};
use serde::{Deserialize, Serialize};

/// Configuration for the dialog client and payload mapping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    /// Base URL of the dialog system (e.g., "https://platform.altinn.no").
    pub dialog_api_base_url: String,

    /// Public base URL of this service, used in action and content URLs.
    pub correspondence_base_url: String,

    /// Bearer token sent with every dialog request.
    pub api_token: Option<String>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            dialog_api_base_url: "https://platform.altinn.no".to_string(),
            correspondence_base_url: "https://platform.altinn.no".to_string(),
            api_token: None,
            request_timeout_secs: 30,
        }
    }
}

impl DialogConfig {
    pub fn validate(&self) -> DialogResult<()> {
        for (name, url) in [
            ("dialog_api_base_url", &self.dialog_api_base_url),
            ("correspondence_base_url", &self.correspondence_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(DialogError::Config(format!(
                    "{name} must be an http(s) URL, got {url:?}"
                )));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(DialogError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Correspondence base URL without a trailing slash.
    pub(crate) fn correspondence_base(&self) -> &str {
        self.correspondence_base_url.trim_end_matches('/')
    }

    pub(crate) fn dialog_base(&self) -> &str {
        self.dialog_api_base_url.trim_end_matches('/')
    }
}
