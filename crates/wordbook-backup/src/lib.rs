//! Whole-notebook backup files: the JSON document format and the
//! write/read paths around it.

mod document;
mod error;
mod writer;

pub use document::{BACKUP_VERSION, BackupDocument, ImportedNotebook, deserialize, serialize};
pub use error::BackupError;
pub use writer::{BackupTarget, BackupWriter, FixedPath, NoDialog, SaveDialog, WrittenBackup, read};
