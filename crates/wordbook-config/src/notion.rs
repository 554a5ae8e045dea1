use std::env;

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://api.notion.com/v1";
pub const DEFAULT_API_VERSION: &str = "2022-06-28";

fn default_enabled() -> bool {
    true
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

/// Remote mirror settings.
///
/// Credentials set here (or through `NOTION_API_KEY` / `NOTION_DATABASE_ID`)
/// take precedence over the ones saved with `wordbook notion set`.
#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct NotionConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub database_id: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl NotionConfig {
    pub fn new() -> Self {
        Self {
            api_key: env::var("NOTION_API_KEY").unwrap_or_default(),
            database_id: env::var("NOTION_DATABASE_ID").unwrap_or_default(),
            api_url: env::var("NOTION_API_URL").unwrap_or_else(|_| default_api_url()),
            ..Self::default()
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.database_id.is_empty()
    }
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            api_key: String::new(),
            database_id: String::new(),
            api_url: default_api_url(),
            api_version: default_api_version(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}
