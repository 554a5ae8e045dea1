use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use wordbook_backup::{BackupWriter, SaveDialog, WrittenBackup};
use wordbook_notion::{RemoteMirror, SyncReport};
use wordbook_store::{NotebookStore, Preferences, StoreError};
use wordbook_types::{Credentials, Entry};

use crate::SyncError;

/// Store that took the authoritative write of a save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryStore {
    EntryStore,
    /// Entry store write failed and the legacy mirror took over
    LegacyMirror,
}

/// What happened to one mirror during a save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorOutcome<T = ()> {
    Written(T),
    Skipped,
    Failed(String),
}

impl<T> MirrorOutcome<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, MirrorOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub primary: PrimaryStore,
    pub legacy: MirrorOutcome,
    pub backup: MirrorOutcome<WrittenBackup>,
    pub remote: MirrorOutcome<SyncReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    EntryStore,
    Remote,
    LegacyMirror,
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub entries: Vec<Entry>,
    pub source: LoadSource,
}

#[derive(Debug)]
pub struct Imported {
    pub entries: Vec<Entry>,
    pub language: Option<String>,
    pub report: SaveReport,
}

/// Single writer for every notebook store.
///
/// A save writes the entry store first (legacy mirror as fallback), then
/// fans out to the legacy mirror, the backup file and the remote mirror
/// concurrently. Mirror failures are logged and reported but never fail the
/// save. Saves are serialized: a save starts only after the previous one
/// finished its local writes, and remote syncs run in the order the saves
/// started.
///
/// When the entry store misses a write, a marker in preferences makes `load`
/// prefer the legacy mirror until the entry store is written again.
pub struct SyncCoordinator {
    primary: Arc<dyn NotebookStore>,
    legacy: Arc<dyn NotebookStore>,
    prefs: Preferences,
    backup: BackupWriter,
    backup_dialog: Option<Arc<dyn SaveDialog>>,
    remote: Option<RemoteMirror>,
    configured_credentials: Option<Credentials>,
    local_writes: Mutex<()>,
    remote_writes: Mutex<()>,
}

impl SyncCoordinator {
    pub fn new(
        primary: Arc<dyn NotebookStore>,
        legacy: Arc<dyn NotebookStore>,
        prefs: Preferences,
        backup: BackupWriter,
    ) -> Self {
        Self {
            primary,
            legacy,
            prefs,
            backup,
            backup_dialog: None,
            remote: None,
            configured_credentials: None,
            local_writes: Mutex::new(()),
            remote_writes: Mutex::new(()),
        }
    }

    /// Write a backup file on every save
    pub fn backup_on_save(mut self, dialog: Arc<dyn SaveDialog>) -> Self {
        self.backup_dialog = Some(dialog);
        self
    }

    /// Mirror saves to a remote database.
    ///
    /// `credentials` from configuration win over the ones saved in
    /// preferences.
    pub fn with_remote(mut self, mirror: RemoteMirror, credentials: Option<Credentials>) -> Self {
        self.remote = Some(mirror);
        self.configured_credentials = credentials.filter(Credentials::is_configured);
        self
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// Credentials to use for the remote mirror, if any
    pub async fn credentials(&self) -> Option<Credentials> {
        if let Some(credentials) = &self.configured_credentials {
            return Some(credentials.clone());
        }
        self.prefs
            .load_credentials()
            .await
            .filter(Credentials::is_configured)
    }

    pub async fn save(&self, entries: &[Entry]) -> Result<SaveReport, SyncError> {
        let mut ids = HashSet::new();
        if let Some(duplicate) = entries.iter().find(|e| !ids.insert(e.id.as_str())) {
            return Err(SyncError::DuplicateId(duplicate.id.clone()));
        }

        let local_guard = self.local_writes.lock().await;

        tracing::debug!("Saving {} entries", entries.len());
        let primary = self.write_primary(entries).await?;
        // queue for the remote before the next save can take the local lock
        let remote_guard = self.remote_writes.lock().await;

        let legacy = async move {
            let outcome = match primary {
                PrimaryStore::EntryStore => self.mirror_legacy(entries).await,
                PrimaryStore::LegacyMirror => MirrorOutcome::Written(()),
            };
            drop(local_guard);
            outcome
        };

        let (legacy, backup, remote) = tokio::join!(
            legacy,
            self.mirror_backup(entries),
            self.mirror_remote(entries, remote_guard),
        );

        Ok(SaveReport {
            primary,
            legacy,
            backup,
            remote,
        })
    }

    async fn write_primary(&self, entries: &[Entry]) -> Result<PrimaryStore, SyncError> {
        let primary_err = match self.primary.put(entries).await {
            Ok(()) => {
                if self.prefs.primary_is_stale().await {
                    self.mark_primary_stale(false).await;
                }
                return Ok(PrimaryStore::EntryStore);
            }
            Err(e) => e,
        };

        tracing::warn!(
            "{} write failed, falling back to {}: {}",
            self.primary.name(),
            self.legacy.name(),
            primary_err
        );

        match self.legacy.put(entries).await {
            Ok(()) => {
                self.mark_primary_stale(true).await;
                Ok(PrimaryStore::LegacyMirror)
            }
            Err(fallback_err) => {
                tracing::error!("{} write failed too: {}", self.legacy.name(), fallback_err);
                Err(SyncError::primary(primary_err, fallback_err))
            }
        }
    }

    async fn mark_primary_stale(&self, stale: bool) {
        if let Err(e) = self.prefs.set_primary_stale(stale).await {
            tracing::warn!("Failed to record {} state: {}", self.primary.name(), e);
        }
    }

    async fn mirror_legacy(&self, entries: &[Entry]) -> MirrorOutcome {
        match self.legacy.put(entries).await {
            Ok(()) => MirrorOutcome::Written(()),
            Err(e) => {
                tracing::error!("Error saving to {}: {}", self.legacy.name(), e);
                MirrorOutcome::Failed(e.to_string())
            }
        }
    }

    async fn mirror_backup(&self, entries: &[Entry]) -> MirrorOutcome<WrittenBackup> {
        let Some(dialog) = &self.backup_dialog else {
            return MirrorOutcome::Skipped;
        };

        let language = self.prefs.load_language().await;
        let document = wordbook_backup::serialize(entries, &language);
        match self.backup.write(&document, dialog.as_ref()).await {
            Ok(written) => MirrorOutcome::Written(written),
            Err(e) => {
                tracing::error!("Error backing up to file: {}", e);
                MirrorOutcome::Failed(e.to_string())
            }
        }
    }

    async fn mirror_remote(
        &self,
        entries: &[Entry],
        _remote_guard: MutexGuard<'_, ()>,
    ) -> MirrorOutcome<SyncReport> {
        let Some(remote) = &self.remote else {
            return MirrorOutcome::Skipped;
        };
        let Some(credentials) = self.credentials().await else {
            tracing::debug!("Remote mirror not configured, skipping");
            return MirrorOutcome::Skipped;
        };

        match remote.upsert_all(entries, &credentials).await {
            Ok(report) => MirrorOutcome::Written(report),
            Err(e) => {
                tracing::error!("Remote sync error: {}", e);
                MirrorOutcome::Failed(e.to_string())
            }
        }
    }

    /// Load the notebook from the first store that has it.
    ///
    /// Entry store, then remote mirror, then legacy mirror. The legacy mirror
    /// goes first while it holds a newer write than the entry store. Never
    /// fails: every store error is logged and the next store is tried.
    pub async fn load(&self) -> Loaded {
        if self.prefs.primary_is_stale().await {
            match self.legacy.get_all().await {
                Ok(entries) => {
                    tracing::info!(
                        "{} is behind, loading {}",
                        self.primary.name(),
                        self.legacy.name()
                    );
                    return Loaded {
                        entries,
                        source: LoadSource::LegacyMirror,
                    };
                }
                Err(e) => tracing::warn!("Error loading from {}: {}", self.legacy.name(), e),
            }
        }

        match self.primary.get_all().await {
            Ok(entries) if !entries.is_empty() => {
                return Loaded {
                    entries,
                    source: LoadSource::EntryStore,
                };
            }
            Ok(_) => tracing::debug!("{} is empty", self.primary.name()),
            Err(e) => tracing::warn!("Error loading from {}: {}", self.primary.name(), e),
        }

        match self.fetch_remote().await {
            Ok(entries) if !entries.is_empty() => {
                return Loaded {
                    entries,
                    source: LoadSource::Remote,
                };
            }
            Ok(_) | Err(SyncError::RemoteNotConfigured) => {}
            Err(e) => tracing::warn!("Error loading from remote mirror: {}", e),
        }

        match self.legacy.get_all().await {
            Ok(entries) if !entries.is_empty() => {
                return Loaded {
                    entries,
                    source: LoadSource::LegacyMirror,
                };
            }
            Ok(_) => {}
            Err(e @ StoreError::CorruptData { .. }) => {
                tracing::warn!("Ignoring unreadable {}: {}", self.legacy.name(), e)
            }
            Err(e) => tracing::warn!("Error loading from {}: {}", self.legacy.name(), e),
        }

        Loaded {
            entries: Vec::new(),
            source: LoadSource::Empty,
        }
    }

    /// Entries currently in the remote mirror
    pub async fn fetch_remote(&self) -> Result<Vec<Entry>, SyncError> {
        let remote = self.remote.as_ref().ok_or(SyncError::RemoteNotConfigured)?;
        let credentials = self
            .credentials()
            .await
            .ok_or(SyncError::RemoteNotConfigured)?;

        Ok(remote.fetch_all(&credentials).await?)
    }

    /// Write a backup document for `entries`; errors are surfaced
    pub async fn export(
        &self,
        entries: &[Entry],
        dialog: &dyn SaveDialog,
    ) -> Result<WrittenBackup, SyncError> {
        let language = self.prefs.load_language().await;
        let document = wordbook_backup::serialize(entries, &language);
        Ok(self.backup.write(&document, dialog).await?)
    }

    /// Replace the notebook with a backup file and resync every store
    pub async fn import(&self, path: &Path) -> Result<Imported, SyncError> {
        let imported = wordbook_backup::read(path).await?;
        tracing::info!(
            "Importing {} entries from {}",
            imported.entries.len(),
            path.display()
        );

        if let Some(language) = &imported.language {
            if let Err(e) = self.prefs.save_language(language).await {
                tracing::warn!("Failed to restore language preference: {}", e);
            }
        }

        let report = self.save(&imported.entries).await?;
        Ok(Imported {
            entries: imported.entries,
            language: imported.language,
            report,
        })
    }

    /// Import the backup file picked interactively last time, if it still exists
    pub async fn restore_last_backup(&self) -> Result<Option<Imported>, SyncError> {
        let Some(file) = self.prefs.remembered_backup().await else {
            tracing::debug!("No remembered backup file");
            return Ok(None);
        };
        if !tokio::fs::try_exists(&file.path).await.unwrap_or(false) {
            tracing::warn!("Remembered backup {} is gone", file.path.display());
            return Ok(None);
        }

        self.import(&file.path).await.map(Some)
    }
}
