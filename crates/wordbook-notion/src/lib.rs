//! Notion database as a remote mirror of the notebook.
//!
//! Remote pages are matched to local entries by their `Word` title, not by
//! the local entry id.

mod client;
pub mod codec;
mod database;
mod error;
#[cfg(any(test, feature = "test-util"))]
mod memory;
mod mirror;
pub mod properties;

pub use client::NotionClient;
pub use database::{RemoteDatabase, RemotePage};
pub use error::RemoteError;
#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryDatabase;
pub use mirror::{RemoteMirror, SyncReport, remote_key};
