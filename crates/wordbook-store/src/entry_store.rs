use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, params};
use wordbook_types::{Entry, Example, timestamp};

use crate::{NotebookStore, StoreError};

/// SQLite-backed entry store, keyed by entry id.
///
/// Open once and share by reference. The connection lives until `close` is
/// called; any use afterwards fails with `StoreUnavailable`.
pub struct EntryStore {
    conn: Arc<Mutex<Option<Connection>>>,
    path: Option<PathBuf>,
}

impl EntryStore {
    /// Open or create the database at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::StoreUnavailable(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        let conn = Connection::open(path).map_err(|e| {
            StoreError::StoreUnavailable(format!("cannot open {}: {e}", path.display()))
        })?;

        tracing::debug!("Opened entry store at {}", path.display());
        Self::with_connection(conn, Some(path.to_path_buf()))
    }

    /// Throwaway store, used by tests and when no data dir is writable
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::StoreUnavailable(e.to_string()))?;
        Self::with_connection(conn, None)
    }

    fn with_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self, StoreError> {
        init_schema(&conn).map_err(|e| StoreError::StoreUnavailable(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            path,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Release the connection
    pub fn close(&self) -> Result<(), StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::StoreUnavailable("entry store lock poisoned".into()))?
            .take();

        match conn {
            Some(conn) => conn.close().map_err(|(_, e)| StoreError::from(e)),
            None => Ok(()),
        }
    }

    async fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::StoreUnavailable("entry store lock poisoned".into()))?;
            let conn = guard
                .as_mut()
                .ok_or_else(|| StoreError::StoreUnavailable("entry store is closed".into()))?;
            f(conn)
        })
        .await?
    }
}

fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS notebook (
            id TEXT PRIMARY KEY,
            word TEXT NOT NULL,
            definition TEXT NOT NULL,
            image_url TEXT NOT NULL,
            examples TEXT NOT NULL,
            usage_note TEXT NOT NULL,
            pronunciation TEXT,
            saved_at TEXT NOT NULL,
            position INTEGER NOT NULL
        )",
        [],
    )?;
    Ok(())
}

struct EntryRow {
    id: String,
    word: String,
    definition: String,
    image_url: String,
    examples: String,
    usage_note: String,
    pronunciation: Option<String>,
    saved_at: String,
}

impl EntryRow {
    fn into_entry(self) -> Entry {
        let examples = serde_json::from_str::<Vec<Example>>(&self.examples).unwrap_or_else(|e| {
            tracing::warn!("Dropping unreadable examples of '{}': {}", self.id, e);
            Vec::new()
        });

        Entry {
            id: self.id,
            word: self.word,
            definition: self.definition,
            image_url: self.image_url,
            examples,
            usage_note: self.usage_note,
            pronunciation: self.pronunciation,
            saved_at: timestamp::parse_or_now(Some(&self.saved_at)),
        }
    }
}

#[async_trait::async_trait]
impl NotebookStore for EntryStore {
    async fn put(&self, entries: &[Entry]) -> Result<(), StoreError> {
        let entries = entries.to_vec();

        self.with_conn(move |conn| {
            // Clear-then-insert runs in one transaction so a failed insert
            // leaves the previous contents in place.
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM notebook", [])?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO notebook
                        (id, word, definition, image_url, examples, usage_note,
                         pronunciation, saved_at, position)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                )?;

                for (position, entry) in entries.iter().enumerate() {
                    stmt.execute(params![
                        entry.id,
                        entry.word,
                        entry.definition,
                        entry.image_url,
                        serde_json::to_string(&entry.examples)?,
                        entry.usage_note,
                        entry.pronunciation,
                        timestamp::format(&entry.saved_at),
                        position as i64,
                    ])?;
                }
            }
            tx.commit()?;

            tracing::debug!("Entry store now holds {} entries", entries.len());
            Ok(())
        })
        .await
    }

    async fn get_all(&self) -> Result<Vec<Entry>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, word, definition, image_url, examples, usage_note,
                        pronunciation, saved_at
                 FROM notebook
                 ORDER BY position",
            )?;

            let rows = stmt.query_map([], |row| {
                Ok(EntryRow {
                    id: row.get(0)?,
                    word: row.get(1)?,
                    definition: row.get(2)?,
                    image_url: row.get(3)?,
                    examples: row.get(4)?,
                    usage_note: row.get(5)?,
                    pronunciation: row.get(6)?,
                    saved_at: row.get(7)?,
                })
            })?;

            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?.into_entry());
            }
            Ok(entries)
        })
        .await
    }

    fn name(&self) -> &'static str {
        "entry store"
    }
}
