use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_on_save() -> bool {
    true
}

fn default_file_name() -> String {
    "ai-dictionary-data.json".to_string()
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct BackupConfig {
    /// Write a backup file after every save
    #[serde(default = "default_on_save")]
    pub on_save: bool,
    /// Ask for a target file before falling back to the backup directory
    #[serde(default)]
    pub interactive: bool,
    /// Fallback directory, the user's downloads folder when unset
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl BackupConfig {
    pub fn new() -> Self {
        Self {
            directory: env::var("WORDBOOK_BACKUP_DIR").ok().map(PathBuf::from),
            ..Self::default()
        }
    }

    /// Directory used when no file was picked interactively
    pub fn fallback_dir(&self) -> Option<PathBuf> {
        self.directory.clone().or_else(dirs::download_dir)
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            on_save: default_on_save(),
            interactive: false,
            directory: None,
            file_name: default_file_name(),
        }
    }
}
