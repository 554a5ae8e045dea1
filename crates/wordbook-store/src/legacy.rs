use std::sync::Arc;

use wordbook_types::Entry;

use crate::{KeyValueStore, NotebookStore, StoreError};

/// Key holding the serialized notebook
pub const NOTEBOOK_KEY: &str = "ai-dictionary-notebook";

/// Whole notebook as one JSON blob in the key-value store.
///
/// Fallback for writes when the entry store fails, and for reads when it is
/// empty or unavailable.
pub struct LegacyMirror {
    kv: Arc<dyn KeyValueStore>,
}

impl LegacyMirror {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }
}

#[async_trait::async_trait]
impl NotebookStore for LegacyMirror {
    async fn put(&self, entries: &[Entry]) -> Result<(), StoreError> {
        let blob = serde_json::to_string(entries)?;
        self.kv.set_item(NOTEBOOK_KEY, &blob).await
    }

    /// Missing key reads as empty; unparseable blob is `CorruptData`
    async fn get_all(&self) -> Result<Vec<Entry>, StoreError> {
        let Some(blob) = self.kv.get_item(NOTEBOOK_KEY).await? else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&blob).map_err(|e| StoreError::CorruptData {
            key: NOTEBOOK_KEY.to_string(),
            reason: e.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "legacy mirror"
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use wordbook_types::{DictionaryResult, Example};

    use super::*;
    use crate::MemoryKeyValueStore;

    #[tokio::test]
    async fn empty_store_reads_as_empty_notebook() {
        let mirror = LegacyMirror::new(Arc::new(MemoryKeyValueStore::new()));
        assert!(mirror.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn put_overwrites_and_preserves_timestamps() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let mirror = LegacyMirror::new(kv.clone());
        let entry = Entry::from_result_at(
            DictionaryResult {
                word: "casa".into(),
                definition: "house".into(),
                examples: vec![Example::new("Mi casa es grande", "My house is big")],
                ..Default::default()
            },
            "es",
            Utc.timestamp_millis_opt(1000).unwrap(),
        );

        mirror.put(&[entry.clone(), entry.clone()]).await.unwrap();
        mirror.put(std::slice::from_ref(&entry)).await.unwrap();

        assert_eq!(mirror.get_all().await.unwrap(), vec![entry]);
        let raw = kv.get_item(NOTEBOOK_KEY).await.unwrap().unwrap();
        assert!(raw.contains("\"savedAt\":\"1970-01-01T00:00:01.000Z\""));
    }

    #[tokio::test]
    async fn garbage_blob_is_corrupt_data() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.set_item(NOTEBOOK_KEY, "{not json").await.unwrap();

        let err = LegacyMirror::new(kv).get_all().await.unwrap_err();
        assert!(matches!(err, StoreError::CorruptData { .. }));
    }
}
