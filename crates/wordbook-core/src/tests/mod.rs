
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use wordbook_backup::BackupWriter;
use wordbook_notion::{MemoryDatabase, RemoteMirror};
use wordbook_store::{
    EntryStore, KeyValueStore, LegacyMirror, MemoryKeyValueStore, NotebookStore, Preferences,
    StoreError,
};
use wordbook_types::{Credentials, DictionaryResult, Entry, Example};

use crate::SyncCoordinator;

pub(crate) fn creds() -> Credentials {
    Credentials::new("secret_test", "db")
}

pub(crate) fn result(word: &str, definition: &str) -> DictionaryResult {
    DictionaryResult {
        word: word.to_string(),
        definition: definition.to_string(),
        examples: vec![Example::new(format!("Mi {word}"), format!("My {word}"))],
        ..Default::default()
    }
}

pub(crate) fn entry(word: &str, definition: &str, millis: i64) -> Entry {
    Entry::from_result_at(
        result(word, definition),
        "es",
        Utc.timestamp_millis_opt(millis).unwrap(),
    )
}

/// Every store a coordinator talks to, kept around for inspection
pub(crate) struct Harness {
    pub entry_store: Arc<EntryStore>,
    pub kv: Arc<MemoryKeyValueStore>,
    pub legacy: Arc<LegacyMirror>,
    pub prefs: Preferences,
    pub remote: Arc<MemoryDatabase>,
    pub backup_dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let kv = Arc::new(MemoryKeyValueStore::new());

        Self {
            entry_store: Arc::new(EntryStore::open_in_memory().unwrap()),
            legacy: Arc::new(LegacyMirror::new(kv.clone())),
            prefs: Preferences::new(kv.clone()),
            kv,
            remote: Arc::new(MemoryDatabase::new()),
            backup_dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn writer(&self) -> BackupWriter {
        BackupWriter::new(
            Some(self.backup_dir.path().to_path_buf()),
            "ai-dictionary-data.json",
        )
        .remembering(self.prefs.clone())
    }

    /// Coordinator without a remote mirror
    pub fn local_only(&self) -> SyncCoordinator {
        SyncCoordinator::new(
            self.entry_store.clone(),
            self.legacy.clone(),
            self.prefs.clone(),
            self.writer(),
        )
    }

    /// Coordinator mirroring to the in-memory remote database
    pub fn coordinator(&self) -> SyncCoordinator {
        self.local_only()
            .with_remote(RemoteMirror::new(self.remote.clone()), Some(creds()))
    }

    pub async fn stored(&self) -> (Vec<Entry>, Vec<Entry>) {
        (
            self.entry_store.get_all().await.unwrap(),
            self.legacy.get_all().await.unwrap(),
        )
    }
}

/// Store whose every call fails
pub(crate) struct FailingStore {
    pub quota: bool,
}

#[async_trait::async_trait]
impl NotebookStore for FailingStore {
    async fn put(&self, _entries: &[Entry]) -> Result<(), StoreError> {
        if self.quota {
            Err(StoreError::QuotaExceeded("storage full".to_string()))
        } else {
            Err(StoreError::StoreUnavailable("store offline".to_string()))
        }
    }

    async fn get_all(&self) -> Result<Vec<Entry>, StoreError> {
        Err(StoreError::StoreUnavailable("store offline".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing store"
    }
}

/// Entry store whose writes can be switched off
pub(crate) struct FlakyStore {
    pub inner: Arc<EntryStore>,
    pub failing: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: Arc<EntryStore>) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl NotebookStore for FlakyStore {
    async fn put(&self, entries: &[Entry]) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::StoreUnavailable("disk detached".to_string()));
        }
        self.inner.put(entries).await
    }

    async fn get_all(&self) -> Result<Vec<Entry>, StoreError> {
        self.inner.get_all().await
    }

    fn name(&self) -> &'static str {
        "flaky store"
    }
}

/// Key-value store whose reads take a while
pub(crate) struct SlowKeyValueStore {
    pub inner: Arc<MemoryKeyValueStore>,
    pub delay: Duration,
}

#[async_trait::async_trait]
impl KeyValueStore for SlowKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove_item(key).await
    }
}
