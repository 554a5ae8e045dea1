use serde_json::{Map, Value};
use wordbook_types::Credentials;

use crate::RemoteError;

/// A record in the remote database
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePage {
    /// Provider-assigned page id
    pub id: String,
    pub archived: bool,
    /// Provider-native property objects keyed by field name
    pub properties: Map<String, Value>,
}

/// The four remote operations the mirror needs
#[async_trait::async_trait]
pub trait RemoteDatabase: Send + Sync {
    /// Every page of the configured database
    async fn query_all(&self, credentials: &Credentials) -> Result<Vec<RemotePage>, RemoteError>;

    /// Create a page and return its id
    async fn create_page(
        &self,
        credentials: &Credentials,
        properties: Map<String, Value>,
    ) -> Result<String, RemoteError>;

    async fn update_page(
        &self,
        credentials: &Credentials,
        page_id: &str,
        properties: Map<String, Value>,
    ) -> Result<(), RemoteError>;

    /// Soft-delete: the page stops showing up in queries
    async fn archive_page(&self, credentials: &Credentials, page_id: &str)
    -> Result<(), RemoteError>;
}
