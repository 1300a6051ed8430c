//! Service configuration.

use crate::error::{CoreError, CoreResult};
use correspondence_dialog::DialogConfig;
use correspondence_storage::CorrespondenceStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// DuckDB file. `None` keeps everything in memory.
    pub database_path: Option<PathBuf>,

    /// Filter used when `RUST_LOG` is unset.
    pub log_filter: String,

    pub dialog: DialogConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            log_filter: "info".to_string(),
            dialog: DialogConfig::default(),
        }
    }
}

impl CoreConfig {
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.log_filter.trim().is_empty() {
            return Err(CoreError::Config("log_filter must not be empty".to_string()));
        }
        if let Some(path) = &self.database_path
            && path.as_os_str().is_empty()
        {
            return Err(CoreError::Config("database_path must not be empty".to_string()));
        }
        self.dialog.validate()?;
        Ok(())
    }

    pub fn open_store(&self) -> CoreResult<CorrespondenceStore> {
        let store = match &self.database_path {
            Some(path) => CorrespondenceStore::open(path)?,
            None => CorrespondenceStore::open_in_memory()?,
        };
        Ok(store)
    }
}
