use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use serde_json::{Map, Value};
use wordbook_types::Credentials;

use crate::{RemoteDatabase, RemoteError, RemotePage, properties};

#[derive(Default)]
struct State {
    pages: Vec<RemotePage>,
    failing_words: HashSet<String>,
    query_error: Option<RemoteError>,
    requests: usize,
}

/// In-memory stand-in for a Notion database, with failure injection
#[derive(Default)]
pub struct MemoryDatabase {
    state: Mutex<State>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a page as if it had been created elsewhere
    pub fn insert(&self, properties: Map<String, Value>) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.state().pages.push(RemotePage {
            id: id.clone(),
            archived: false,
            properties,
        });
        id
    }

    /// Every page, archived ones included
    pub fn pages(&self) -> Vec<RemotePage> {
        self.state().pages.clone()
    }

    /// Words of the pages that are not archived, in creation order
    pub fn live_words(&self) -> Vec<String> {
        self.state()
            .pages
            .iter()
            .filter(|p| !p.archived)
            .map(|p| properties::word(&p.properties))
            .collect()
    }

    /// Make every create/update for `word` fail
    pub fn fail_writes_for(&self, word: &str) {
        self.state().failing_words.insert(word.to_string());
    }

    /// Make queries fail until cleared with `None`
    pub fn fail_queries_with(&self, error: Option<RemoteError>) {
        self.state().query_error = error;
    }

    /// Number of calls made so far
    pub fn requests(&self) -> usize {
        self.state().requests
    }

    fn check(state: &mut State, credentials: &Credentials) -> Result<(), RemoteError> {
        state.requests += 1;
        if credentials.is_configured() {
            Ok(())
        } else {
            Err(RemoteError::Auth("missing credentials".to_string()))
        }
    }

    fn check_word(state: &State, properties: &Map<String, Value>) -> Result<(), RemoteError> {
        let word = properties::word(properties);
        if state.failing_words.contains(&word) {
            Err(RemoteError::Transient(format!("injected failure for '{word}'")))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl RemoteDatabase for MemoryDatabase {
    async fn query_all(&self, credentials: &Credentials) -> Result<Vec<RemotePage>, RemoteError> {
        let mut state = self.state();
        Self::check(&mut state, credentials)?;
        if let Some(error) = &state.query_error {
            return Err(error.clone());
        }
        Ok(state.pages.clone())
    }

    async fn create_page(
        &self,
        credentials: &Credentials,
        properties: Map<String, Value>,
    ) -> Result<String, RemoteError> {
        let mut state = self.state();
        Self::check(&mut state, credentials)?;
        Self::check_word(&state, &properties)?;

        let id = uuid::Uuid::new_v4().to_string();
        state.pages.push(RemotePage {
            id: id.clone(),
            archived: false,
            properties,
        });
        Ok(id)
    }

    async fn update_page(
        &self,
        credentials: &Credentials,
        page_id: &str,
        properties: Map<String, Value>,
    ) -> Result<(), RemoteError> {
        let mut state = self.state();
        Self::check(&mut state, credentials)?;
        Self::check_word(&state, &properties)?;

        let page = state
            .pages
            .iter_mut()
            .find(|p| p.id == page_id)
            .ok_or_else(|| RemoteError::NotFound(page_id.to_string()))?;
        page.properties.extend(properties);
        Ok(())
    }

    async fn archive_page(
        &self,
        credentials: &Credentials,
        page_id: &str,
    ) -> Result<(), RemoteError> {
        let mut state = self.state();
        Self::check(&mut state, credentials)?;

        let page = state
            .pages
            .iter_mut()
            .find(|p| p.id == page_id)
            .ok_or_else(|| RemoteError::NotFound(page_id.to_string()))?;
        page.archived = true;
        Ok(())
    }
}
