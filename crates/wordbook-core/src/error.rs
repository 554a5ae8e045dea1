use wordbook_backup::BackupError;
use wordbook_notion::RemoteError;
use wordbook_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Local storage is full ({0}). Remove some entries or free up space and try again.")]
    QuotaExceeded(StoreError),

    #[error("Saving failed: {primary}; fallback store also failed: {fallback}")]
    Primary {
        primary: StoreError,
        fallback: StoreError,
    },

    #[error("Entry '{0}' is already in the notebook")]
    DuplicateId(String),

    #[error("Backup error: {0}")]
    Backup(#[from] BackupError),

    #[error("Remote mirror is not configured")]
    RemoteNotConfigured,

    #[error("Remote mirror error: {0}")]
    Remote(#[from] RemoteError),
}

impl SyncError {
    /// Both local writes failed
    pub(crate) fn primary(primary: StoreError, fallback: StoreError) -> Self {
        if fallback.is_quota() {
            SyncError::QuotaExceeded(fallback)
        } else if primary.is_quota() {
            SyncError::QuotaExceeded(primary)
        } else {
            SyncError::Primary { primary, fallback }
        }
    }
}
