use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use wordbook_backup::{BackupError, SaveDialog};

/// Asks for a backup path on the terminal.
///
/// An empty answer cancels. Without a terminal on stdin the dialog reports
/// itself unavailable so the backup goes to the fallback directory.
pub struct TerminalPrompt;

#[async_trait::async_trait]
impl SaveDialog for TerminalPrompt {
    async fn pick_save_path(&self, suggested_name: &str) -> Result<Option<PathBuf>, BackupError> {
        if !atty::is(atty::Stream::Stdin) {
            return Err(BackupError::DialogUnavailable(
                "stdin is not a terminal".to_string(),
            ));
        }

        let mut stderr = tokio::io::stderr();
        stderr
            .write_all(
                format!("Save backup as (file or folder, empty to skip) [{suggested_name}]: ")
                    .as_bytes(),
            )
            .await?;
        stderr.flush().await?;

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await?;

        Ok(resolve_answer(line.trim(), suggested_name))
    }
}

fn resolve_answer(answer: &str, suggested_name: &str) -> Option<PathBuf> {
    if answer.is_empty() {
        return None;
    }

    let path = PathBuf::from(answer);
    if path.is_dir() {
        Some(path.join(suggested_name))
    } else {
        Some(path)
    }
}
