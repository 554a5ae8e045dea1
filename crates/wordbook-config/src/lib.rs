use std::env;

use serde::{Deserialize, Serialize};

use self::backup::BackupConfig;
use self::logging::LoggingConfig;
use self::notion::NotionConfig;
use self::storage::StorageConfig;

pub mod backup;
pub mod logging;
pub mod notion;
pub mod storage;

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub backup: BackupConfig,
    pub notion: NotionConfig,
    pub logging: LoggingConfig,

    /// Language the user is learning when none was saved yet
    pub default_language: String,
}

impl Config {
    /// Defaults with environment overrides applied
    pub fn new() -> Self {
        let default_language =
            env::var("WORDBOOK_LANGUAGE").unwrap_or_else(|_| "en".to_string());

        Config {
            storage: StorageConfig::new(),
            backup: BackupConfig::new(),
            notion: NotionConfig::new(),
            logging: LoggingConfig::new(),

            default_language,
        }
    }

    /// Re-apply environment overrides on top of a config loaded from disk
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = env::var("WORDBOOK_DATA_DIR") {
            self.storage.data_dir = dir.into();
        }
        if let Ok(dir) = env::var("WORDBOOK_BACKUP_DIR") {
            self.backup.directory = Some(dir.into());
        }
        if let Ok(key) = env::var("NOTION_API_KEY") {
            self.notion.api_key = key;
        }
        if let Ok(id) = env::var("NOTION_DATABASE_ID") {
            self.notion.database_id = id;
        }
        if let Ok(url) = env::var("NOTION_API_URL") {
            self.notion.api_url = url;
        }
        if let Ok(level) = env::var("WORDBOOK_LOG") {
            self.logging.level = level;
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            backup: BackupConfig::default(),
            notion: NotionConfig::default(),
            logging: LoggingConfig::default(),
            default_language: "en".to_string(),
        }
    }
}
