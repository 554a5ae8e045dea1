mod entry_store;
mod error;
mod kv;
mod legacy;
mod prefs;

pub use entry_store::EntryStore;
pub use error::StoreError;
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use legacy::{LegacyMirror, NOTEBOOK_KEY};
pub use prefs::{
    BACKUP_HANDLE_KEY, CREDENTIALS_KEY, LANGUAGE_KEY, Preferences, RememberedFile,
    STALE_PRIMARY_KEY,
};

use wordbook_types::Entry;

/// A local store holding a full copy of the notebook
#[async_trait::async_trait]
pub trait NotebookStore: Send + Sync {
    /// Replace the stored notebook with `entries`
    async fn put(&self, entries: &[Entry]) -> Result<(), StoreError>;

    /// Every stored entry, in notebook order
    async fn get_all(&self) -> Result<Vec<Entry>, StoreError>;

    /// Name used in logs and reports
    fn name(&self) -> &'static str;
}
