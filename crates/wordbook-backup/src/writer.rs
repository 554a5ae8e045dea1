use std::path::{Path, PathBuf};

use wordbook_store::{Preferences, RememberedFile};

use crate::{BackupDocument, BackupError, ImportedNotebook, document};

/// Interactive "save as" step.
///
/// `Ok(None)` means the user cancelled, which is not an error: the writer
/// falls back to the backup directory.
#[async_trait::async_trait]
pub trait SaveDialog: Send + Sync {
    async fn pick_save_path(&self, suggested_name: &str) -> Result<Option<PathBuf>, BackupError>;
}

/// No interactive step available
pub struct NoDialog;

#[async_trait::async_trait]
impl SaveDialog for NoDialog {
    async fn pick_save_path(&self, _suggested_name: &str) -> Result<Option<PathBuf>, BackupError> {
        Err(BackupError::DialogUnavailable("no interactive session".to_string()))
    }
}

/// Target chosen up front, e.g. from a command-line flag
pub struct FixedPath(pub PathBuf);

#[async_trait::async_trait]
impl SaveDialog for FixedPath {
    async fn pick_save_path(&self, _suggested_name: &str) -> Result<Option<PathBuf>, BackupError> {
        Ok(Some(self.0.clone()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupTarget {
    /// Path returned by the save dialog
    Picked,
    /// Automatic write into the backup directory
    Download,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenBackup {
    pub path: PathBuf,
    pub via: BackupTarget,
}

pub struct BackupWriter {
    fallback_dir: Option<PathBuf>,
    file_name: String,
    prefs: Option<Preferences>,
}

impl BackupWriter {
    pub fn new(fallback_dir: Option<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            fallback_dir,
            file_name: file_name.into(),
            prefs: None,
        }
    }

    /// Remember interactively picked files for a later restore
    pub fn remembering(mut self, prefs: Preferences) -> Self {
        self.prefs = Some(prefs);
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Write `document`, trying the dialog first and the backup directory second
    pub async fn write(
        &self,
        document: &BackupDocument,
        dialog: &dyn SaveDialog,
    ) -> Result<WrittenBackup, BackupError> {
        let json = document.to_json()?;

        match dialog.pick_save_path(&self.file_name).await {
            Ok(Some(path)) => match write_file(&path, &json).await {
                Ok(()) => {
                    self.remember(&path).await;
                    tracing::info!("Backup written to {}", path.display());
                    return Ok(WrittenBackup {
                        path,
                        via: BackupTarget::Picked,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        "Writing backup to {} failed, using download fallback: {}",
                        path.display(),
                        e
                    );
                }
            },
            Ok(None) => tracing::debug!("Save dialog cancelled, using download fallback"),
            Err(e) => tracing::debug!("{}, using download fallback", e),
        }

        let dir = self
            .fallback_dir
            .as_ref()
            .ok_or(BackupError::NoBackupDirectory)?;
        let path = dir.join(&self.file_name);
        write_file(&path, &json).await?;

        tracing::info!("Backup downloaded to {}", path.display());
        Ok(WrittenBackup {
            path,
            via: BackupTarget::Download,
        })
    }

    async fn remember(&self, path: &Path) {
        let Some(prefs) = &self.prefs else {
            return;
        };

        let file = RememberedFile {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.file_name.clone()),
            path: path.to_path_buf(),
        };
        if let Err(e) = prefs.remember_backup(&file).await {
            tracing::warn!("Failed to remember backup location: {}", e);
        }
    }
}

async fn write_file(path: &Path, contents: &str) -> Result<(), BackupError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}

/// Read a backup or exported notebook from disk
pub async fn read(path: &Path) -> Result<ImportedNotebook, BackupError> {
    let contents = tokio::fs::read_to_string(path).await?;
    let value = serde_json::from_str(&contents)
        .map_err(|e| BackupError::InvalidFormat(format!("{}: {e}", path.display())))?;
    document::deserialize(value)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wordbook_store::MemoryKeyValueStore;
    use wordbook_types::{DictionaryResult, Entry};

    use super::*;
    use crate::serialize;

    struct Cancelled;

    #[async_trait::async_trait]
    impl SaveDialog for Cancelled {
        async fn pick_save_path(&self, _: &str) -> Result<Option<PathBuf>, BackupError> {
            Ok(None)
        }
    }

    fn document() -> BackupDocument {
        let entry = Entry::from_result(
            DictionaryResult {
                word: "casa".into(),
                ..Default::default()
            },
            "es",
        );
        serialize(&[entry], "es")
    }

    #[tokio::test]
    async fn picked_path_is_written_and_remembered() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::new(Arc::new(MemoryKeyValueStore::new()));
        let writer = BackupWriter::new(None, "ai-dictionary-data.json").remembering(prefs.clone());
        let target = dir.path().join("mine.json");

        let written = writer
            .write(&document(), &FixedPath(target.clone()))
            .await
            .unwrap();

        assert_eq!(written.via, BackupTarget::Picked);
        assert_eq!(read(&target).await.unwrap().entries.len(), 1);
        let remembered = prefs.remembered_backup().await.unwrap();
        assert_eq!(remembered.name, "mine.json");
        assert_eq!(remembered.path, target);
    }

    #[tokio::test]
    async fn cancel_and_missing_dialog_fall_back_to_download() {
        let dir = tempfile::tempdir().unwrap();
        let writer = BackupWriter::new(Some(dir.path().to_path_buf()), "ai-dictionary-data.json");

        let cancelled = writer.write(&document(), &Cancelled).await.unwrap();
        let unavailable = writer.write(&document(), &NoDialog).await.unwrap();

        let expected = dir.path().join("ai-dictionary-data.json");
        assert_eq!(cancelled.via, BackupTarget::Download);
        assert_eq!(cancelled.path, expected);
        assert_eq!(unavailable.path, expected);
    }

    #[tokio::test]
    async fn no_fallback_directory_is_an_error() {
        let writer = BackupWriter::new(None, "ai-dictionary-data.json");
        let result = writer.write(&document(), &NoDialog).await;

        assert!(matches!(result, Err(BackupError::NoBackupDirectory)));
    }

    #[tokio::test]
    async fn unparseable_file_is_invalid_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        tokio::fs::write(&path, "{ definitely not json").await.unwrap();

        assert!(matches!(
            read(&path).await,
            Err(BackupError::InvalidFormat(_))
        ));
        assert!(matches!(
            read(&dir.path().join("missing.json")).await,
            Err(BackupError::Io(_))
        ));
    }
}
