use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wordbook")
}

fn default_database_file() -> String {
    "notebook.sqlite3".to_string()
}

fn default_kv_dir() -> String {
    "local-storage".to_string()
}

fn default_legacy_quota() -> Option<u64> {
    Some(5 * 1024 * 1024)
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Root for the entry database and the key-value store
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_database_file")]
    pub database_file: String,
    #[serde(default = "default_kv_dir")]
    pub kv_dir: String,
    /// Byte budget for the key-value store, `None` for unlimited
    #[serde(default = "default_legacy_quota")]
    pub legacy_quota_bytes: Option<u64>,
}

impl StorageConfig {
    pub fn new() -> Self {
        let data_dir = env::var("WORDBOOK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir());

        Self {
            data_dir,
            ..Self::default()
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn kv_path(&self) -> PathBuf {
        self.data_dir.join(&self.kv_dir)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: default_database_file(),
            kv_dir: default_kv_dir(),
            legacy_quota_bytes: default_legacy_quota(),
        }
    }
}
