use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wordbook_types::{Entry, timestamp};

use crate::BackupError;

pub const BACKUP_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub notebook: Vec<Entry>,
    pub language: String,
    #[serde(with = "timestamp")]
    pub backup_date: DateTime<Utc>,
    pub version: String,
}

impl BackupDocument {
    pub fn to_json(&self) -> Result<String, BackupError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of reading a backup: entries plus the language, when recorded
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedNotebook {
    pub entries: Vec<Entry>,
    pub language: Option<String>,
}

pub fn serialize(entries: &[Entry], language: &str) -> BackupDocument {
    BackupDocument {
        notebook: entries.to_vec(),
        language: language.to_string(),
        backup_date: Utc::now(),
        version: BACKUP_VERSION.to_string(),
    }
}

/// Accepts a bare entry array or a `{ "notebook": [...] }` wrapper
pub fn deserialize(document: Value) -> Result<ImportedNotebook, BackupError> {
    let (notebook, language) = match document {
        Value::Array(_) => (document, None),
        Value::Object(mut map) => {
            let notebook = match map.remove("notebook") {
                Some(notebook @ Value::Array(_)) => notebook,
                _ => {
                    return Err(BackupError::InvalidFormat(
                        "expected a 'notebook' array".to_string(),
                    ));
                }
            };
            let language = map
                .remove("language")
                .and_then(|v| v.as_str().map(str::to_string))
                .filter(|l| !l.is_empty());
            (notebook, language)
        }
        other => {
            return Err(BackupError::InvalidFormat(format!(
                "expected an array or an object, found {}",
                kind(&other)
            )));
        }
    };

    let entries: Vec<Entry> = serde_json::from_value(notebook)
        .map_err(|e| BackupError::InvalidFormat(format!("bad entry: {e}")))?;

    let mut ids = HashSet::new();
    if let Some(duplicate) = entries.iter().find(|e| !ids.insert(e.id.as_str())) {
        return Err(BackupError::InvalidFormat(format!(
            "entry id '{}' appears more than once",
            duplicate.id
        )));
    }

    Ok(ImportedNotebook { entries, language })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;
    use wordbook_types::{DictionaryResult, Example};

    use super::*;

    fn notebook() -> Vec<Entry> {
        ["casa", "perro"]
            .iter()
            .enumerate()
            .map(|(i, word)| {
                Entry::from_result_at(
                    DictionaryResult {
                        word: word.to_string(),
                        definition: format!("{word}?"),
                        examples: vec![Example::new(format!("Mi {word}"), format!("My {word}"))],
                        ..Default::default()
                    },
                    "es",
                    Utc.timestamp_millis_opt(1000 + i as i64).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn export_then_import_gives_back_the_entries() {
        let entries = notebook();
        let document = serialize(&entries, "es");
        let json = document.to_json().unwrap();

        let imported = deserialize(serde_json::from_str(&json).unwrap()).unwrap();

        assert_eq!(imported.entries, entries);
        assert_eq!(imported.language.as_deref(), Some("es"));
        assert_eq!(document.version, "1.0");
    }

    #[test]
    fn bare_array_and_wrapper_are_equivalent() {
        let entries = notebook();
        let bare = serde_json::to_value(&entries).unwrap();
        let wrapped = json!({ "notebook": bare.clone() });

        let from_bare = deserialize(bare).unwrap();
        let from_wrapped = deserialize(wrapped).unwrap();

        assert_eq!(from_bare.entries, from_wrapped.entries);
        assert_eq!(from_bare.language, None);
    }

    #[test]
    fn missing_saved_at_defaults_to_now() {
        let before = timestamp::now();
        let imported = deserialize(json!([{ "id": "x-en-1", "word": "x" }])).unwrap();

        assert!(imported.entries[0].saved_at >= before);
        assert!(imported.entries[0].examples.is_empty());
    }

    #[test]
    fn repeated_ids_are_invalid() {
        let entries = notebook();
        let document = json!({ "notebook": [entries[0].clone(), entries[1].clone(), entries[0].clone()] });

        let err = deserialize(document).unwrap_err();

        assert!(matches!(err, BackupError::InvalidFormat(ref reason) if reason.contains("casa-es-1000")));
    }

    #[test]
    fn other_shapes_are_invalid() {
        for document in [
            json!({ "entries": [] }),
            json!({ "notebook": "nope" }),
            json!("notebook"),
            json!([{ "definition": "no word or id" }]),
        ] {
            assert!(matches!(
                deserialize(document),
                Err(BackupError::InvalidFormat(_))
            ));
        }
    }
}
