mod credentials;
mod entry;
pub mod timestamp;

pub use credentials::Credentials;
pub use entry::{DictionaryResult, Entry, Example};

/// Ordered collection of saved entries
pub type Entries = Vec<Entry>;
