use std::time::Duration;

use reqwest::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use wordbook_types::Credentials;

use crate::{RemoteDatabase, RemoteError, RemotePage};

const PAGE_SIZE: u32 = 100;

/// Notion REST API client
#[derive(Clone)]
pub struct NotionClient {
    base_url: String,
    api_version: String,
    client: reqwest::Client,
}

impl NotionClient {
    pub fn new(
        base_url: impl Into<String>,
        api_version: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transient(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_version: api_version.into(),
            client,
        })
    }

    /// Send one API request
    async fn send<T>(
        &self,
        credentials: &Credentials,
        method: Method,
        path: &str,
        body: Value,
    ) -> Result<T, RemoteError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("Notion {} {}", method, url);

        let response = self
            .client
            .request(method, &url)
            .bearer_auth(&credentials.api_key)
            .header("Notion-Version", &self.api_version)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::from_status(status, error_message(&body)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(format!("Failed to parse Notion response: {e}")))
    }
}

/// Notion error bodies look like `{"object":"error","code":...,"message":...}`
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[derive(Deserialize)]
struct QueryResponse {
    results: Vec<PageObject>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct PageObject {
    id: String,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    in_trash: bool,
    #[serde(default)]
    properties: Map<String, Value>,
}

impl From<PageObject> for RemotePage {
    fn from(page: PageObject) -> Self {
        RemotePage {
            id: page.id,
            archived: page.archived || page.in_trash,
            properties: page.properties,
        }
    }
}

#[async_trait::async_trait]
impl RemoteDatabase for NotionClient {
    async fn query_all(&self, credentials: &Credentials) -> Result<Vec<RemotePage>, RemoteError> {
        let path = format!("databases/{}/query", credentials.database_id);
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = json!({ "page_size": PAGE_SIZE });
            if let Some(cursor) = &cursor {
                body["start_cursor"] = json!(cursor);
            }

            let response: QueryResponse = self
                .send(credentials, Method::POST, &path, body)
                .await?;
            pages.extend(response.results.into_iter().map(RemotePage::from));

            match response.next_cursor {
                Some(next) if response.has_more => cursor = Some(next),
                _ => break,
            }
        }

        tracing::debug!("Queried {} Notion pages", pages.len());
        Ok(pages)
    }

    async fn create_page(
        &self,
        credentials: &Credentials,
        properties: Map<String, Value>,
    ) -> Result<String, RemoteError> {
        let body = json!({
            "parent": { "database_id": credentials.database_id },
            "properties": properties,
        });

        let page: PageObject = self.send(credentials, Method::POST, "pages", body).await?;
        Ok(page.id)
    }

    async fn update_page(
        &self,
        credentials: &Credentials,
        page_id: &str,
        properties: Map<String, Value>,
    ) -> Result<(), RemoteError> {
        let body = json!({ "properties": properties });
        let _: Value = self
            .send(credentials, Method::PATCH, &format!("pages/{page_id}"), body)
            .await?;
        Ok(())
    }

    async fn archive_page(
        &self,
        credentials: &Credentials,
        page_id: &str,
    ) -> Result<(), RemoteError> {
        let body = json!({ "archived": true });
        let _: Value = self
            .send(credentials, Method::PATCH, &format!("pages/{page_id}"), body)
            .await?;
        Ok(())
    }
}
