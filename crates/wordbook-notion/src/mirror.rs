use std::collections::btree_map::Entry as MapEntry;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use wordbook_types::{Credentials, Entry};

use crate::{RemoteDatabase, RemoteError, properties};

/// Remote identity of a local entry
pub fn remote_key(entry: &Entry) -> &str {
    &entry.word
}

/// Outcome of one `upsert_all`. Individual failures are listed by word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub archived: usize,
    pub failed: Vec<String>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct RemoteMirror {
    database: Arc<dyn RemoteDatabase>,
}

impl RemoteMirror {
    pub fn new(database: Arc<dyn RemoteDatabase>) -> Self {
        Self { database }
    }

    /// Make the remote database mirror `entries`.
    ///
    /// Pages are matched on their word: matches are updated, the rest are
    /// created, and pages whose word is no longer in the notebook are
    /// archived. A failing page is recorded in the report and the batch
    /// goes on. Only the initial query can fail the whole call.
    pub async fn upsert_all(
        &self,
        entries: &[Entry],
        credentials: &Credentials,
    ) -> Result<SyncReport, RemoteError> {
        let pages = self.database.query_all(credentials).await?;

        let mut existing: BTreeMap<String, String> = BTreeMap::new();
        let mut duplicates: Vec<(String, String)> = Vec::new();
        for page in pages.into_iter().filter(|p| !p.archived) {
            let word = properties::word(&page.properties);
            if word.is_empty() {
                continue;
            }
            match existing.entry(word) {
                MapEntry::Vacant(slot) => {
                    slot.insert(page.id);
                }
                MapEntry::Occupied(slot) => duplicates.push((slot.key().clone(), page.id)),
            }
        }

        let local = latest_per_word(entries);
        let mut report = SyncReport::default();

        for entry in &local {
            let page_properties = properties::entry_properties(entry);

            match existing.get(remote_key(entry)) {
                Some(page_id) => {
                    match self
                        .database
                        .update_page(credentials, page_id, page_properties)
                        .await
                    {
                        Ok(()) => report.updated += 1,
                        Err(e) => {
                            tracing::error!("Error updating page for {}: {}", entry.word, e);
                            report.failed.push(entry.word.clone());
                        }
                    }
                }
                None => match self.database.create_page(credentials, page_properties).await {
                    Ok(page_id) => {
                        tracing::debug!("Created page {} for {}", page_id, entry.word);
                        report.created += 1;
                    }
                    Err(e) => {
                        tracing::error!("Error creating page for {}: {}", entry.word, e);
                        report.failed.push(entry.word.clone());
                    }
                },
            }
        }

        let kept: HashSet<&str> = local.iter().map(|e| remote_key(e)).collect();
        let stale = existing
            .into_iter()
            .filter(|(word, _)| !kept.contains(word.as_str()))
            .chain(duplicates);

        for (word, page_id) in stale {
            match self.database.archive_page(credentials, &page_id).await {
                Ok(()) => report.archived += 1,
                Err(e) => {
                    tracing::error!("Error archiving page for {}: {}", word, e);
                    report.failed.push(word);
                }
            }
        }

        tracing::info!(
            "Remote sync: {} created, {} updated, {} archived, {} failed",
            report.created,
            report.updated,
            report.archived,
            report.failed.len()
        );
        Ok(report)
    }

    /// Every live remote page that carries a word, as entries
    pub async fn fetch_all(&self, credentials: &Credentials) -> Result<Vec<Entry>, RemoteError> {
        let pages = self.database.query_all(credentials).await?;

        Ok(pages
            .iter()
            .filter(|p| !p.archived)
            .filter_map(|p| properties::entry_from_page(&p.properties))
            .collect())
    }
}

/// One entry per word, first-seen order, the most recently saved one winning
fn latest_per_word(entries: &[Entry]) -> Vec<&Entry> {
    let mut order: Vec<&str> = Vec::new();
    let mut latest: HashMap<&str, &Entry> = HashMap::new();

    for entry in entries {
        let key = remote_key(entry);
        match latest.get(key).copied() {
            None => {
                order.push(key);
                latest.insert(key, entry);
            }
            Some(current) => {
                tracing::debug!("Entries {} and {} share a remote page", current.id, entry.id);
                if entry.saved_at >= current.saved_at {
                    latest.insert(key, entry);
                }
            }
        }
    }

    order.into_iter().filter_map(|key| latest.get(key).copied()).collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use wordbook_types::{DictionaryResult, Example};

    use super::*;
    use crate::MemoryDatabase;

    fn creds() -> Credentials {
        Credentials::new("secret_test", "db")
    }

    fn entry(word: &str, definition: &str, millis: i64) -> Entry {
        Entry::from_result_at(
            DictionaryResult {
                word: word.to_string(),
                definition: definition.to_string(),
                examples: vec![Example::new(format!("Mi {word}"), format!("My {word}"))],
                ..Default::default()
            },
            "es",
            Utc.timestamp_millis_opt(millis).unwrap(),
        )
    }

    fn setup() -> (Arc<MemoryDatabase>, RemoteMirror) {
        let db = Arc::new(MemoryDatabase::new());
        (db.clone(), RemoteMirror::new(db))
    }

    #[tokio::test]
    async fn existing_word_is_updated_not_duplicated() {
        let (db, mirror) = setup();
        db.insert(properties::entry_properties(&entry("casa", "old", 1)));

        let report = mirror
            .upsert_all(&[entry("casa", "house", 2)], &creds())
            .await
            .unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(report.created, 0);
        assert_eq!(db.live_words(), vec!["casa"]);
        let fetched = mirror.fetch_all(&creds()).await.unwrap();
        assert_eq!(fetched[0].definition, "house");
    }

    #[tokio::test]
    async fn removed_entries_are_archived_and_not_fetched() {
        let (db, mirror) = setup();
        db.insert(properties::entry_properties(&entry("casa", "house", 1)));

        let report = mirror.upsert_all(&[], &creds()).await.unwrap();

        assert_eq!(report.archived, 1);
        assert_eq!(db.pages().len(), 1);
        assert!(db.pages()[0].archived);
        assert!(mirror.fetch_all(&creds()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_batch() {
        let (db, mirror) = setup();
        db.fail_writes_for("b");

        let report = mirror
            .upsert_all(
                &[entry("a", "", 1), entry("b", "", 2), entry("c", "", 3)],
                &creds(),
            )
            .await
            .unwrap();

        assert_eq!(report.created, 2);
        assert_eq!(report.failed, vec!["b"]);
        assert_eq!(db.live_words(), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn repeated_sync_is_idempotent() {
        let (db, mirror) = setup();
        let notebook = vec![entry("casa", "house", 1), entry("perro", "dog", 2)];

        mirror.upsert_all(&notebook, &creds()).await.unwrap();
        let second = mirror.upsert_all(&notebook, &creds()).await.unwrap();

        assert_eq!(second.created, 0);
        assert_eq!(second.updated, 2);
        assert_eq!(db.live_words(), vec!["casa", "perro"]);
    }

    #[tokio::test]
    async fn same_word_collapses_to_latest_entry() {
        let (db, mirror) = setup();
        let notebook = vec![entry("casa", "newer", 5), entry("casa", "older", 1)];

        let report = mirror.upsert_all(&notebook, &creds()).await.unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(db.live_words(), vec!["casa"]);
        assert_eq!(mirror.fetch_all(&creds()).await.unwrap()[0].definition, "newer");
    }

    #[tokio::test]
    async fn duplicate_remote_pages_are_archived() {
        let (db, mirror) = setup();
        db.insert(properties::entry_properties(&entry("casa", "one", 1)));
        db.insert(properties::entry_properties(&entry("casa", "two", 2)));

        let report = mirror
            .upsert_all(&[entry("casa", "house", 3)], &creds())
            .await
            .unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(report.archived, 1);
        assert_eq!(db.live_words(), vec!["casa"]);
    }

    #[tokio::test]
    async fn query_failure_fails_the_sync() {
        let (db, mirror) = setup();
        db.fail_queries_with(Some(RemoteError::NotFound("db".into())));

        let result = mirror.upsert_all(&[entry("casa", "", 1)], &creds()).await;

        assert!(matches!(result, Err(RemoteError::NotFound(_))));
        assert_eq!(db.requests(), 1);
    }

    #[tokio::test]
    async fn bad_credentials_surface_as_auth_errors() {
        let (_, mirror) = setup();
        let result = mirror.fetch_all(&Credentials::default()).await;

        assert!(matches!(result, Err(RemoteError::Auth(_))));
    }
}
