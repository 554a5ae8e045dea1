mod coordinator;
mod error;
mod notebook;

pub use coordinator::{
    Imported, LoadSource, Loaded, MirrorOutcome, PrimaryStore, SaveReport, SyncCoordinator,
};
pub use error::SyncError;
pub use notebook::{Notebook, Toggled};

#[cfg(test)]
mod tests;
