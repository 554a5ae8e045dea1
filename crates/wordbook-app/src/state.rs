use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use wordbook_backup::{BackupWriter, NoDialog, SaveDialog};
use wordbook_config::Config;
use wordbook_core::SyncCoordinator;
use wordbook_notion::{NotionClient, RemoteMirror};
use wordbook_store::{
    EntryStore, FileKeyValueStore, KeyValueStore, LANGUAGE_KEY, LegacyMirror, Preferences,
};
use wordbook_types::Credentials;

use crate::dialog::TerminalPrompt;

pub struct AppState {
    pub config: Config,
    pub entry_store: Arc<EntryStore>,
    pub prefs: Preferences,
    pub coordinator: Arc<SyncCoordinator>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let storage = &config.storage;
        tokio::fs::create_dir_all(&storage.data_dir)
            .await
            .with_context(|| format!("Failed to create {}", storage.data_dir.display()))?;

        let entry_store = match EntryStore::open(&storage.database_path()) {
            Ok(store) => store,
            Err(e) => {
                tracing::error!("{}, keeping entries in memory for this run", e);
                EntryStore::open_in_memory()?
            }
        };
        let entry_store = Arc::new(entry_store);
        let kv: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::open(
            &storage.kv_path(),
            storage.legacy_quota_bytes,
        )?);
        let legacy = Arc::new(LegacyMirror::new(kv.clone()));
        let prefs = Preferences::new(kv.clone());

        if kv.get_item(LANGUAGE_KEY).await?.is_none() {
            prefs.save_language(&config.default_language).await?;
        }

        let writer = BackupWriter::new(config.backup.fallback_dir(), &config.backup.file_name)
            .remembering(prefs.clone());

        let mut coordinator =
            SyncCoordinator::new(entry_store.clone(), legacy, prefs.clone(), writer);

        if config.backup.on_save {
            coordinator = coordinator.backup_on_save(backup_dialog(&config));
        }

        if config.notion.enabled {
            let notion = &config.notion;
            let client = NotionClient::new(
                &notion.api_url,
                &notion.api_version,
                Duration::from_secs(notion.timeout_seconds),
            )?;
            let configured = notion
                .has_credentials()
                .then(|| Credentials::new(&notion.api_key, &notion.database_id));
            coordinator = coordinator.with_remote(RemoteMirror::new(Arc::new(client)), configured);
        }

        Ok(Self {
            config,
            entry_store,
            prefs,
            coordinator: Arc::new(coordinator),
        })
    }

    /// Release the entry store before exit
    pub fn close(&self) {
        if let Err(e) = self.entry_store.close() {
            tracing::warn!("Failed to close entry store: {}", e);
        }
    }
}

/// Interactive prompt when enabled, automatic download otherwise
pub fn backup_dialog(config: &Config) -> Arc<dyn SaveDialog> {
    if config.backup.interactive {
        Arc::new(TerminalPrompt)
    } else {
        Arc::new(NoDialog)
    }
}
