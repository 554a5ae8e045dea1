use wordbook_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("Invalid backup format: {0}")]
    InvalidFormat(String),

    #[error("Save dialog unavailable: {0}")]
    DialogUnavailable(String),

    #[error("No directory to write the backup into")]
    NoBackupDirectory,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
