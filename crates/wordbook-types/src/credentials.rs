use serde::{Deserialize, Serialize};

/// API key and database id for the remote mirror, stored client-side
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub database_id: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, database_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            database_id: database_id.into(),
        }
    }

    /// Both parts present
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.database_id.is_empty()
    }
}

// Keep the key out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"***")
            .field("database_id", &self.database_id)
            .finish()
    }
}
