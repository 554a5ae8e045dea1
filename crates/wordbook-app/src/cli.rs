use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wordbook", about = "Vocabulary notebook with local and Notion sync", version)]
pub struct Cli {
    /// Profile under the wordbook config folder
    #[arg(long, global = true, default_value = crate::profile::MAIN_PROFILE)]
    pub profile: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List saved entries
    List,

    /// Save a word, or remove it if it is already saved for the language
    Save {
        word: String,
        /// Language being learned (defaults to the saved preference)
        #[arg(long)]
        lang: Option<String>,
        #[arg(long, default_value = "")]
        definition: String,
        /// Example as "sentence=>translation", repeatable
        #[arg(long = "example")]
        examples: Vec<String>,
        #[arg(long, default_value = "")]
        usage_note: String,
        #[arg(long, default_value = "")]
        image_url: String,
        #[arg(long)]
        pronunciation: Option<String>,
    },

    /// Remove an entry by id
    Remove { id: String },

    /// Write the current notebook to every store
    Sync,

    /// Export the notebook to a backup file
    Export {
        /// Target file; prompts or uses the backup folder when omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replace the notebook with a backup file
    Import { file: PathBuf },

    /// Re-import the backup file picked last time
    Restore,

    /// Show or set the language being learned
    Language { code: Option<String> },

    /// Notion mirror settings
    #[command(subcommand)]
    Notion(NotionCommand),
}

#[derive(Subcommand)]
pub enum NotionCommand {
    /// Save Notion credentials
    Set {
        #[arg(long)]
        api_key: String,
        #[arg(long)]
        database_id: String,
    },

    /// Forget saved Notion credentials
    Clear,

    /// Show whether the mirror is configured
    Status,

    /// Show the entries stored in Notion
    Pull {
        /// Replace the local notebook with them
        #[arg(long)]
        replace: bool,
    },
}
