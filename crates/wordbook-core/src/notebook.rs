use std::path::Path;
use std::sync::Arc;

use wordbook_backup::{SaveDialog, WrittenBackup};
use wordbook_types::{DictionaryResult, Entry};

use crate::{Imported, LoadSource, SaveReport, SyncCoordinator, SyncError};

#[derive(Debug)]
pub enum Toggled {
    Saved { id: String, report: SaveReport },
    Removed { id: String, report: SaveReport },
}

/// The session's notebook.
///
/// Every mutation updates the in-memory list and then saves it through the
/// coordinator.
pub struct Notebook {
    entries: Vec<Entry>,
    coordinator: Arc<SyncCoordinator>,
}

impl Notebook {
    pub async fn open(coordinator: Arc<SyncCoordinator>) -> (Self, LoadSource) {
        let loaded = coordinator.load().await;
        tracing::info!(
            "Loaded {} entries from {:?}",
            loaded.entries.len(),
            loaded.source
        );

        let notebook = Self {
            entries: loaded.entries,
            coordinator,
        };
        (notebook, loaded.source)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Save a lookup result, or remove it if it is already saved for this language
    pub async fn toggle(
        &mut self,
        result: DictionaryResult,
        target_language: &str,
    ) -> Result<Toggled, SyncError> {
        let existing = self
            .entries
            .iter()
            .position(|e| e.is_saved_result(&result.word, target_language));

        match existing {
            Some(index) => {
                let removed = self.entries.remove(index);
                let report = self.sync().await?;
                Ok(Toggled::Removed {
                    id: removed.id,
                    report,
                })
            }
            None => {
                let entry = Entry::from_result(result, target_language);
                let id = entry.id.clone();
                let report = self.add(entry).await?;
                Ok(Toggled::Saved { id, report })
            }
        }
    }

    pub async fn add(&mut self, entry: Entry) -> Result<SaveReport, SyncError> {
        if self.get(&entry.id).is_some() {
            return Err(SyncError::DuplicateId(entry.id));
        }
        self.entries.push(entry);
        self.sync().await
    }

    /// `None` when no entry has this id
    pub async fn remove(&mut self, id: &str) -> Result<Option<SaveReport>, SyncError> {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            return Ok(None);
        }
        self.sync().await.map(Some)
    }

    /// Save the current entries to every store
    pub async fn sync(&self) -> Result<SaveReport, SyncError> {
        self.coordinator.save(&self.entries).await
    }

    /// Swap in a whole new set of entries and save it
    pub async fn replace(&mut self, entries: Vec<Entry>) -> Result<SaveReport, SyncError> {
        self.entries = entries;
        self.sync().await
    }

    pub async fn import(&mut self, path: &Path) -> Result<Imported, SyncError> {
        let imported = self.coordinator.import(path).await?;
        self.entries = imported.entries.clone();
        Ok(imported)
    }

    pub async fn export(&self, dialog: &dyn SaveDialog) -> Result<WrittenBackup, SyncError> {
        self.coordinator.export(&self.entries, dialog).await
    }

    pub async fn restore_last_backup(&mut self) -> Result<Option<Imported>, SyncError> {
        let restored = self.coordinator.restore_last_backup().await?;
        if let Some(imported) = &restored {
            self.entries = imported.entries.clone();
        }
        Ok(restored)
    }
}
