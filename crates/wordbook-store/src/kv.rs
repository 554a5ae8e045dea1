use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::StoreError;

/// Flat string key-value storage
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;

    async fn remove_item(&self, key: &str) -> Result<(), StoreError>;
}

/// One file per key inside a directory, with an optional byte quota
pub struct FileKeyValueStore {
    dir: PathBuf,
    quota_bytes: Option<u64>,
}

impl FileKeyValueStore {
    pub fn open(dir: &Path, quota_bytes: Option<u64>) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir).map_err(|e| {
            StoreError::StoreUnavailable(format!("cannot create {}: {e}", dir.display()))
        })?;

        Ok(Self {
            dir: dir.to_path_buf(),
            quota_bytes,
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file_name}.value"))
    }

    /// Bytes used by every key except `skip`
    async fn used_bytes(&self, skip: &Path) -> Result<u64, StoreError> {
        let mut used = 0;
        let mut dir = tokio::fs::read_dir(&self.dir).await?;
        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if path == skip || path.extension().is_none_or(|ext| ext != "value") {
                continue;
            }
            used += item.metadata().await?.len();
        }
        Ok(used)
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);

        if let Some(quota) = self.quota_bytes {
            let needed = self.used_bytes(&path).await? + value.len() as u64;
            if needed > quota {
                return Err(StoreError::QuotaExceeded(format!(
                    "writing '{key}' needs {needed} bytes, quota is {quota}"
                )));
            }
        }

        // Write then rename so a crash never leaves a half-written value
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process key-value store
#[derive(Default)]
pub struct MemoryKeyValueStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.items
            .lock()
            .map_err(|_| StoreError::StoreUnavailable("key-value lock poisoned".into()))
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items()?.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.items()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_round_trips_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::open(dir.path(), None).unwrap();

        assert_eq!(store.get_item("ai-dictionary-language").await.unwrap(), None);
        store.set_item("ai-dictionary-language", "es").await.unwrap();
        store.set_item("ai-dictionary-language", "el").await.unwrap();
        assert_eq!(
            store.get_item("ai-dictionary-language").await.unwrap().as_deref(),
            Some("el")
        );

        store.remove_item("ai-dictionary-language").await.unwrap();
        store.remove_item("ai-dictionary-language").await.unwrap();
        assert_eq!(store.get_item("ai-dictionary-language").await.unwrap(), None);
    }

    #[tokio::test]
    async fn quota_counts_other_keys_but_not_the_overwritten_one() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::open(dir.path(), Some(10)).unwrap();

        store.set_item("a", "12345").await.unwrap();
        store.set_item("b", "12345").await.unwrap();
        // Overwriting "b" with the same size still fits
        store.set_item("b", "54321").await.unwrap();

        let err = store.set_item("c", "1").await.unwrap_err();
        assert!(err.is_quota());
        assert_eq!(store.get_item("c").await.unwrap(), None);
    }

    #[tokio::test]
    async fn memory_store_behaves_like_a_map() {
        let store = MemoryKeyValueStore::new();
        store.set_item("k", "v").await.unwrap();
        assert_eq!(store.get_item("k").await.unwrap().as_deref(), Some("v"));
        store.remove_item("k").await.unwrap();
        assert_eq!(store.get_item("k").await.unwrap(), None);
    }
}
