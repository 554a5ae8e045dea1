use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use wordbook_types::Credentials;

use crate::{KeyValueStore, StoreError};

pub const LANGUAGE_KEY: &str = "ai-dictionary-language";
pub const CREDENTIALS_KEY: &str = "notion-config";
pub const BACKUP_HANDLE_KEY: &str = "ai-dictionary-file-handle";
pub const STALE_PRIMARY_KEY: &str = "wordbook-entry-store-stale";

const DEFAULT_LANGUAGE: &str = "en";

/// Backup file the user picked last time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RememberedFile {
    pub name: String,
    pub path: PathBuf,
}

/// Small client-side settings kept next to the legacy mirror
#[derive(Clone)]
pub struct Preferences {
    kv: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Saved language, `"en"` when unset or unreadable
    pub async fn load_language(&self) -> String {
        match self.kv.get_item(LANGUAGE_KEY).await {
            Ok(Some(language)) if !language.is_empty() => language,
            Ok(_) => DEFAULT_LANGUAGE.to_string(),
            Err(e) => {
                tracing::warn!("Failed to read language preference: {}", e);
                DEFAULT_LANGUAGE.to_string()
            }
        }
    }

    pub async fn save_language(&self, language: &str) -> Result<(), StoreError> {
        self.kv.set_item(LANGUAGE_KEY, language).await
    }

    /// Stored remote credentials; unreadable values count as not configured
    pub async fn load_credentials(&self) -> Option<Credentials> {
        let raw = match self.kv.get_item(CREDENTIALS_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Failed to read remote credentials: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<Credentials>(&raw) {
            Ok(credentials) => Some(credentials),
            Err(e) => {
                tracing::warn!("Ignoring unreadable remote credentials: {}", e);
                None
            }
        }
    }

    pub async fn save_credentials(&self, credentials: &Credentials) -> Result<(), StoreError> {
        let raw = serde_json::to_string(credentials)?;
        self.kv.set_item(CREDENTIALS_KEY, &raw).await
    }

    pub async fn clear_credentials(&self) -> Result<(), StoreError> {
        self.kv.remove_item(CREDENTIALS_KEY).await
    }

    pub async fn is_configured(&self) -> bool {
        self.load_credentials()
            .await
            .is_some_and(|c| c.is_configured())
    }

    pub async fn remembered_backup(&self) -> Option<RememberedFile> {
        let raw = self.kv.get_item(BACKUP_HANDLE_KEY).await.ok()??;
        serde_json::from_str(&raw).ok()
    }

    pub async fn remember_backup(&self, file: &RememberedFile) -> Result<(), StoreError> {
        let raw = serde_json::to_string(file)?;
        self.kv.set_item(BACKUP_HANDLE_KEY, &raw).await
    }

    /// True while the last save missed the entry store and only reached the
    /// legacy mirror
    pub async fn primary_is_stale(&self) -> bool {
        matches!(self.kv.get_item(STALE_PRIMARY_KEY).await, Ok(Some(_)))
    }

    pub async fn set_primary_stale(&self, stale: bool) -> Result<(), StoreError> {
        if stale {
            self.kv.set_item(STALE_PRIMARY_KEY, "true").await
        } else {
            self.kv.remove_item(STALE_PRIMARY_KEY).await
        }
    }
}
